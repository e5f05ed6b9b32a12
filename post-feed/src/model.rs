use serde::{Deserialize, Serialize};

/// One post from the remote collection.
///
/// Posts are immutable once fetched; the feed cache owns them and views only borrow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
}
