use clap::Subcommand;
use focushub_core::persistence::AMBIENCES;

use super::{CliResult, Session};

#[derive(Subcommand)]
pub enum AmbienceAction {
    /// Select an ambience (simple, rain, nature, fire, ocean, night)
    Set { id: String },
    /// Show the selected ambience and the available ones
    Show,
}

pub async fn run(action: AmbienceAction) -> CliResult {
    let mut session = Session::open().await?;

    match action {
        AmbienceAction::Set { id } => {
            let selected = session.hub.set_ambience(&id).to_string();
            if selected != id {
                eprintln!("unknown ambience '{id}', using '{selected}'");
            }
            println!("Ambience: {selected}");
        }
        AmbienceAction::Show => {
            let current = session.hub.ambience();
            for id in AMBIENCES {
                let marker = if id == current { '>' } else { ' ' };
                println!("{marker} {id}");
            }
        }
    }

    session.close().await;
    Ok(())
}
