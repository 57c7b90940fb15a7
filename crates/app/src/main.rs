//! Tiffin - terminal front-end for the restaurant discovery backend.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (tokens are persisted for later invocations)
//! tiffin login --phone 9999999999 --role customer
//!
//! # Browse listings
//! tiffin browse
//! tiffin browse --tab popular
//! tiffin browse --city Bangalore --cuisine Indian
//! tiffin browse --code REST001
//!
//! # Owner dashboard and profile
//! tiffin restaurant
//! tiffin whoami
//! tiffin logout
//! ```
//!
//! Configuration comes from the environment (see `tiffin_client::config`);
//! the nearby tab additionally reads `TIFFIN_LATITUDE`/`TIFFIN_LONGITUDE`.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use tiffin_app::{
    BrowseController, BrowseTab, FixedLocation, LocationProvider, LocationUnavailable,
    OwnerController, presentation,
};
use tiffin_client::{ApiClient, Config, FileCredentialStore, Session};
use tiffin_core::Role;

#[derive(Parser)]
#[command(name = "tiffin")]
#[command(author, version, about = "Restaurant discovery client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with a phone number
    Login {
        /// Ten-digit phone number
        #[arg(short, long)]
        phone: String,

        /// Role to sign in as
        #[arg(short, long, value_enum, default_value_t = RoleArg::Customer)]
        role: RoleArg,
    },
    /// Sign out and clear the stored tokens
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Browse restaurant listings
    Browse {
        /// Listing tab to show
        #[arg(short, long, value_enum, default_value_t = TabArg::All)]
        tab: TabArg,

        /// Filter the "all" listing by city
        #[arg(long)]
        city: Option<String>,

        /// Filter the "all" listing by cuisine type
        #[arg(long)]
        cuisine: Option<String>,

        /// Look up one restaurant by its unique code
        #[arg(long)]
        code: Option<String>,
    },
    /// Show the owner dashboard for the signed-in owner
    Restaurant,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Customer,
    Owner,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Customer => Self::Customer,
            RoleArg::Owner => Self::RestaurantOwner,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TabArg {
    All,
    Popular,
    New,
    Nearby,
}

impl From<TabArg> for BrowseTab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::All => Self::All,
            TabArg::Popular => Self::Popular,
            TabArg::New => Self::New,
            TabArg::Nearby => Self::Nearby,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = Config::from_env().expect("Failed to load configuration");

    // Defaults to info level for our crates if RUST_LOG is not set
    let default_filter = if config.debug {
        "tiffin=debug"
    } else {
        "tiffin=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = Arc::new(FileCredentialStore::new().expect("Failed to open credential storage"));
    let api = ApiClient::new(&config, store);
    let session = Session::new(api.clone());

    // Silent restore from the persisted token, if any
    session.restore().await;

    match cli.command {
        Commands::Login { phone, role } => {
            match session.login(&phone, role.into()).await {
                Ok(()) => {
                    if let Some(user) = session.current_user() {
                        println!("Signed in as {}", describe_user(&user));
                    }
                }
                Err(err) => println!("Login failed: {err}"),
            }
        }
        Commands::Logout => {
            session.logout().await;
            println!("Signed out");
        }
        Commands::Whoami => match session.current_user() {
            Some(user) => println!("{}", describe_user(&user)),
            None => println!("Not signed in"),
        },
        Commands::Browse {
            tab,
            city,
            cuisine,
            code,
        } => {
            let location: Arc<dyn LocationProvider> = match FixedLocation::from_env() {
                Some(provider) => Arc::new(provider),
                None => Arc::new(LocationUnavailable),
            };
            let mut browse = BrowseController::new(api.clone(), &config, location);

            if let Some(city) = city.as_deref() {
                browse.set_city(city);
            }
            if let Some(cuisine) = cuisine.as_deref() {
                browse.set_cuisine_type(cuisine);
            }

            browse.load().await;
            if let Some(code) = code.as_deref() {
                browse.search_by_code(code).await;
            } else {
                browse.select_tab(tab.into()).await;
            }

            if let Some(warning) = browse.location_warning() {
                println!("{warning}");
            }
            if let Some(status) = browse.status() {
                println!("{}", status.text());
            }

            if browse.current_restaurants().is_empty() {
                println!("No restaurants found");
            }
            for restaurant in browse.current_restaurants() {
                println!("{}\n", presentation::restaurant_summary(restaurant));
            }
        }
        Commands::Restaurant => {
            let Some(user) = session.current_user() else {
                println!("Not signed in");
                return;
            };
            // Gates the view only; the backend re-checks every owner call
            if !user.has_role(Role::RestaurantOwner) {
                println!("Owner tools require the restaurant owner role");
                return;
            }

            let mut owner = OwnerController::new(api.clone());
            owner.load().await;

            match owner.restaurant() {
                Some(restaurant) => {
                    println!("{}", presentation::restaurant_summary(restaurant));
                    println!(
                        "store size: {}",
                        presentation::store_size_label(restaurant.store_size)
                    );
                }
                None => println!("No restaurant yet - create one to get started"),
            }

            println!("\nCategories ({}):", owner.categories().len());
            for category in owner.categories() {
                println!("  {}", category.name);
            }

            println!("\nMenu ({}):", owner.menu_items().len());
            for item in owner.menu_items() {
                println!("  {}", presentation::menu_item_summary(item));
            }

            println!("\nSpecials ({}):", owner.specials().len());
            for item in owner.specials() {
                println!("  {}", presentation::menu_item_summary(item));
            }
        }
    }
}

fn describe_user(user: &tiffin_client::User) -> String {
    let name = user
        .full_name
        .clone()
        .or_else(|| user.username.clone())
        .or_else(|| user.phone_number.clone())
        .unwrap_or_else(|| user.id.to_string());
    let roles: Vec<&str> = user
        .roles
        .iter()
        .map(|role| presentation::role_label(*role))
        .collect();
    format!("{name} ({})", roles.join(", "))
}
