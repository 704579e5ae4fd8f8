//! Terminal chat client for a chatlink server.
//!
//! Keeps the session tokens in a cookie file under the data directory, talks
//! to the REST API and joins the realtime channel at `/ws`. When the server
//! rejects an expired access token the client refreshes it once and retries.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatlink -- login alice
//! cargo run --bin chatlink -- chat --group 3
//! cargo run --bin chatlink -- --base-url http://127.0.0.1:5000 rooms
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use rustyline::DefaultEditor;

use chatlink_client::{
    ClientError,
    config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_DATA_DIR},
    domain::{ChatScope, HistoryEntry, RenderedMessage, RoomRef, UserId},
    infrastructure::{ApiClient, WebSocketTransport, http::dto::FriendAction},
    session::{FileCookieStorage, SessionStore},
    ui::{MessageFormatter, run_chat},
    usecase::{AuthService, ContactsService, FriendRequestOutcome, ProfileService},
};
use chatlink_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "chatlink")]
#[command(
    about = "Terminal chat client with persistent login and realtime rooms",
    long_about = None
)]
struct Args {
    /// Server base URL
    #[arg(short = 'u', long, env = "CHATLINK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory holding the cookie file
    #[arg(short = 'd', long, env = "CHATLINK_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with a username or user id
    Login {
        identifier: String,
        /// Password; prompted for when omitted
        #[arg(short, long, env = "CHATLINK_PASSWORD")]
        password: Option<String>,
    },
    /// Create an account
    Register {
        username: String,
        #[arg(short, long, env = "CHATLINK_PASSWORD")]
        password: Option<String>,
    },
    /// Log out and forget the stored tokens
    Logout,
    /// Open the interactive chat (global room by default)
    Chat {
        /// Private chat with this user
        #[arg(long, conflicts_with_all = ["group", "room"])]
        user: Option<String>,
        /// Group room id
        #[arg(long, conflicts_with = "room")]
        group: Option<String>,
        /// Any room id
        #[arg(long)]
        room: Option<String>,
    },
    /// List the rooms you belong to
    Rooms,
    /// Show the first messages of a room
    History {
        room: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 50)]
        size: u32,
    },
    /// Search groups by name
    SearchGroups { query: String },
    /// Leave a group
    LeaveGroup { room: String },
    /// Search users by name or id
    SearchUsers { query: String },
    /// List your friends
    Friends,
    /// List pending friend requests
    FriendRequests,
    /// Send a friend request
    AddFriend { user: String },
    /// Accept a friend request
    Accept {
        user: String,
        /// Open the new private room right away
        #[arg(long)]
        open: bool,
    },
    /// Reject a friend request
    Reject { user: String },
    /// Remove a friend
    DeleteFriend { user: String },
    /// Change your username
    Rename { username: String },
    /// Change your password
    ChangePassword {
        /// Current password; prompted for when omitted
        #[arg(long, env = "CHATLINK_PASSWORD")]
        current: Option<String>,
        /// New password; prompted for when omitted
        #[arg(long)]
        new: Option<String>,
    },
}

fn chat_scope(
    user: Option<String>,
    group: Option<String>,
    room: Option<String>,
) -> Result<ChatScope, ClientError> {
    Ok(match (user, group, room) {
        (Some(peer), _, _) => ChatScope::Private {
            peer: UserId::new(&peer),
        },
        (None, Some(group), _) => ChatScope::Group {
            room: RoomRef::parse(&group)?,
        },
        (None, None, Some(room)) => ChatScope::Room {
            room: RoomRef::parse(&room)?,
        },
        (None, None, None) => ChatScope::Global,
    })
}

async fn prompt_line(prompt: &'static str) -> Result<String, ClientError> {
    let line = tokio::task::spawn_blocking(move || {
        DefaultEditor::new().and_then(|mut rl| rl.readline(prompt))
    })
    .await
    .map_err(|e| ClientError::Io(std::io::Error::other(e)))?;
    line.map_err(|e| ClientError::Io(std::io::Error::other(e)))
}

fn print_history(entries: &[HistoryEntry], own_id: Option<&UserId>) {
    if entries.is_empty() {
        println!("(No messages)");
    }
    for entry in entries {
        print!(
            "{}",
            MessageFormatter::format_chat_message(&RenderedMessage {
                sender: entry.sender.clone(),
                body: entry.body.clone(),
                is_self: own_id == Some(&entry.sender_id),
                sent_at: entry.sent_at,
            })
        );
    }
}

async fn run(args: Args) -> Result<(), ClientError> {
    let config = ClientConfig::new(&args.base_url, args.data_dir)?;
    let storage = FileCookieStorage::new(config.cookie_file());
    let session = Arc::new(SessionStore::open(
        Box::new(storage),
        Arc::new(SystemClock),
    )?);
    let api = Arc::new(ApiClient::new(config.clone(), session.clone()));
    let auth = AuthService::new(api.clone());
    let contacts = ContactsService::new(api.clone());
    let profile = ProfileService::new(api.clone());
    let own_id = session.identity_hint().map(|hint| UserId::new(&hint));

    match args.command {
        Command::Login {
            identifier,
            password,
        } => {
            let password = match password {
                Some(password) => password,
                None => prompt_line("Password: ").await?,
            };
            let response = auth.login(&identifier, &password).await?;
            println!(
                "Logged in as {}",
                response.username.as_deref().unwrap_or(&identifier)
            );
        }
        Command::Register { username, password } => {
            let (password, confirm) = match password {
                Some(password) => (password.clone(), password),
                None => (
                    prompt_line("Password: ").await?,
                    prompt_line("Confirm password: ").await?,
                ),
            };
            let response = auth.register(&username, &password, &confirm).await?;
            println!("Registered {} with user id {}", username, response.user_id);
        }
        Command::Logout => {
            auth.logout().await?;
            println!("Logged out");
        }
        Command::Chat { user, group, room } => {
            let scope = chat_scope(user, group, room)?;
            let transport = Arc::new(WebSocketTransport::new(config.ws_endpoint()?));
            run_chat(api, transport, scope).await?;
        }
        Command::Rooms => {
            let rooms = contacts.rooms().await?;
            print!("{}", MessageFormatter::format_rooms(&rooms, own_id.as_ref()));
        }
        Command::History { room, page, size } => {
            let room = RoomRef::parse(&room)?;
            let response = api.room_history(&room, page, size).await?;
            let entries: Vec<HistoryEntry> =
                response.data.into_iter().map(HistoryEntry::from).collect();
            print_history(&entries, own_id.as_ref());
            if response.has_more {
                println!("(more messages on page {})", page + 1);
            }
        }
        Command::SearchGroups { query } => {
            let groups = contacts.search_groups(&query).await?;
            print!("{}", MessageFormatter::format_groups(&groups));
        }
        Command::LeaveGroup { room } => {
            let msg = contacts.leave_group(&RoomRef::parse(&room)?).await?;
            println!("{}", msg);
        }
        Command::SearchUsers { query } => {
            let users = contacts.search_users(&query).await?;
            print!("{}", MessageFormatter::format_users(&users, "No users found"));
        }
        Command::Friends => {
            let friends = contacts.friends().await?;
            print!("{}", MessageFormatter::format_users(&friends, "No friends"));
        }
        Command::FriendRequests => {
            let requests = contacts.friend_requests().await?;
            print!(
                "{}",
                MessageFormatter::format_users(&requests, "No pending requests")
            );
        }
        Command::AddFriend { user } => {
            match contacts.send_friend_request(&UserId::new(&user)).await? {
                FriendRequestOutcome::Sent(msg) => println!("{}", msg),
                FriendRequestOutcome::AlreadyFriends => {
                    println!("{} is already your friend", user)
                }
            }
        }
        Command::Accept { user, open } => {
            let response = contacts
                .answer_friend_request(&UserId::new(&user), FriendAction::Accept)
                .await?;
            println!("{}", response.msg.unwrap_or_default());
            if let Some(room) = response.room_id {
                println!("Private room {} is ready", room);
                if open {
                    let transport = Arc::new(WebSocketTransport::new(config.ws_endpoint()?));
                    run_chat(api, transport, ChatScope::Room { room }).await?;
                }
            }
        }
        Command::Reject { user } => {
            let response = contacts
                .answer_friend_request(&UserId::new(&user), FriendAction::Reject)
                .await?;
            println!("{}", response.msg.unwrap_or_default());
        }
        Command::DeleteFriend { user } => {
            let msg = contacts.delete_friend(&UserId::new(&user)).await?;
            println!("{}", msg);
        }
        Command::Rename { username } => {
            let msg = profile.update_username(&username).await?;
            println!("{}", msg);
        }
        Command::ChangePassword { current, new } => {
            let current = match current {
                Some(current) => current,
                None => prompt_line("Current password: ").await?,
            };
            let new = match new {
                Some(new) => new,
                None => prompt_line("New password: ").await?,
            };
            let msg = profile.update_password(&current, &new).await?;
            println!("{}", msg);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    if let Err(e) = run(args).await {
        tracing::error!("Client error: {}", e);
        eprintln!("Error: {}", e);
        if e.requires_login() {
            eprintln!("Run `chatlink login <username>` to sign in again.");
        }
        std::process::exit(1);
    }
}
