use clap::Subcommand;
use focushub_core::identity::{clear_session, complete_sign_in, store_session};
use focushub_core::UserProfile;
use serde_json::json;

use super::{print_json, CliResult, Session};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in with the profile returned by the identity provider
    Login {
        /// Stable user id
        uid: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        photo: Option<String>,
    },
    /// Sign out; state goes back to this device
    Logout,
    /// Show who is signed in and where state is stored
    Status,
}

pub async fn run(action: AuthAction) -> CliResult {
    let mut session = Session::open().await?;

    match action {
        AuthAction::Login {
            uid,
            email,
            name,
            photo,
        } => {
            let mut profile = UserProfile::new(uid, email);
            if let Some(name) = name {
                profile = profile.with_display_name(name);
            }
            if let Some(photo) = photo {
                profile = profile.with_photo_url(photo);
            }

            store_session(session.db.as_ref(), &profile)?;
            if let Some(store) = &session.remote {
                let mailer = session.mailer()?;
                if let Err(e) = complete_sign_in(store.as_ref(), mailer.as_ref(), &profile).await {
                    tracing::warn!(uid = %profile.uid, "profile registration failed: {e}");
                }
            }
            session.hub.load(Some(&profile)).await;
            println!("Signed in as {} ({})", profile.uid, profile.email);
            session.auth.sign_in(profile);
        }
        AuthAction::Logout => {
            clear_session(session.db.as_ref())?;
            session.auth.sign_out();
            session.hub.load(None).await;
            println!("Signed out");
        }
        AuthAction::Status => {
            print_json(&json!({
                "user": session.auth.current(),
                "backend": session.hub.backend_kind(),
            }))?;
        }
    }

    session.close().await;
    Ok(())
}
