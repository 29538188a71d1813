mod backoff;
mod condition;
mod config;
mod cursor;
mod task;

pub(crate) use condition::RevealConditionKind;
pub(crate) use config::RevealWatcherConfig;
pub(crate) use task::RevealWatcherTask;
