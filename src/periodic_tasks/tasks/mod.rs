pub(crate) mod reveal_watcher;
