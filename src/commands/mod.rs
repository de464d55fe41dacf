// Command modules
mod keyword;
mod movie;
mod prize;
mod setup;
mod stats;
mod task;

use crate::models::{Context, Error};

// Re-export all commands
pub use keyword::keyword;
pub use movie::movie;
pub use prize::prize;
pub use setup::setup;
pub use stats::stats;
pub use task::task;

/// Reply only the invoking user can see
async fn reply_ephemeral(ctx: Context<'_>, content: String) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
