use clap::Subcommand;
use focushub_core::notify::send_thank_you;

use super::{CliResult, Session};

#[derive(Subcommand)]
pub enum EmailAction {
    /// Send a thank-you email (defaults to the signed-in user's address)
    ThankYou {
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
}

pub async fn run(action: EmailAction) -> CliResult {
    let session = Session::open().await?;

    match action {
        EmailAction::ThankYou { email, name } => {
            let user = session.auth.current();
            let email = email
                .or_else(|| user.map(|u| u.email.clone()))
                .unwrap_or_default();
            let name = name.or_else(|| {
                user.map(|u| u.display_name.clone())
                    .filter(|n| !n.is_empty())
            });

            let mailer = session.mailer()?;
            send_thank_you(mailer.as_ref(), &email, name.as_deref()).await?;
            println!("Thank-you email sent to {email}");
        }
    }

    session.close().await;
    Ok(())
}
