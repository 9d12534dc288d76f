use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rand_chacha::ChaCha8Rng;
use syndicate_content::ContentProvider;
use syndicate_control::{Candidate, Session};
use syndicate_core::NewsItem;
use tokio::sync::broadcast;

/// Everything behind the lock. Never held across an await.
pub struct GameDesk {
    pub session: Session,
    pub rng: ChaCha8Rng,
    /// The candidate last drafted, waiting for confirm or cancel.
    pub draft: Option<Candidate>,
}

pub type SharedDesk = Arc<Mutex<GameDesk>>;
pub type NewsTx = broadcast::Sender<Vec<NewsItem>>;

#[derive(Clone)]
pub struct AppState {
    pub desk: SharedDesk,
    pub provider: Arc<dyn ContentProvider>,
    pub news_tx: NewsTx,
    pub save_dir: PathBuf,
}

impl AppState {
    pub fn new(
        session: Session,
        rng: ChaCha8Rng,
        provider: Arc<dyn ContentProvider>,
        save_dir: PathBuf,
    ) -> Self {
        let (news_tx, _) = broadcast::channel(64);
        Self {
            desk: Arc::new(Mutex::new(GameDesk {
                session,
                rng,
                draft: None,
            })),
            provider,
            news_tx,
            save_dir,
        }
    }
}
