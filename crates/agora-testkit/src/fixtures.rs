//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use agora_core::{CategoryId, PostAuthor, PostId, PostRecord, SetKey, TopicId, UserId};
use agora_perms::GrantTable;
use agora_store::{MemoryStore, StoreWriter};

/// Timestamp of the first post in every fixture topic.
pub const BASE_TIMESTAMP: i64 = 1_700_000_000_000;

/// A topic and its posts, in creation order.
#[derive(Debug, Clone)]
pub struct TopicFixture {
    pub tid: TopicId,
    pub cid: CategoryId,
    pub posts: Vec<PostRecord>,
}

impl TopicFixture {
    /// A topic in category 1 whose posts were created one second apart in
    /// the given order, all by user 1, with no votes.
    pub fn new(tid: u64, pids: &[u64]) -> Self {
        let tid = TopicId::new(tid).expect("topic id must be positive");
        let cid = CategoryId::new(1).expect("category id must be positive");
        let author = UserId(1);

        let posts = pids
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let pid = PostId::new(n).expect("post id must be positive");
                PostRecord::new(pid, tid, author, format!("<p>post {} in topic {}</p>", n, tid))
                    .with_category(cid)
                    .with_timestamp(BASE_TIMESTAMP + i as i64 * 1000)
                    .with_author(PostAuthor {
                        uid: author,
                        username: format!("user{}", author),
                        signature: format!("-- user{}", author),
                    })
            })
            .collect();

        Self { tid, cid, posts }
    }

    /// Move the topic and its posts into another category.
    pub fn in_category(mut self, cid: u64) -> Self {
        self.cid = CategoryId::new(cid).expect("category id must be positive");
        for post in &mut self.posts {
            post.cid = Some(self.cid);
        }
        self
    }

    /// Net vote score per post, in creation order.
    pub fn with_votes(mut self, votes: &[i64]) -> Self {
        for (post, &net) in self.posts.iter_mut().zip(votes) {
            let (up, down) = if net >= 0 { (net as u64, 0) } else { (0, net.unsigned_abs()) };
            *post = post.clone().with_votes(up, down);
        }
        self
    }

    /// Reassign every post to `uid`.
    pub fn authored_by(mut self, uid: UserId) -> Self {
        for post in &mut self.posts {
            post.uid = uid;
            if let Some(user) = post.user.as_mut() {
                user.uid = uid;
            }
        }
        self
    }

    /// Soft-delete one post.
    pub fn delete(mut self, pid: u64) -> Self {
        for post in &mut self.posts {
            if post.pid.get() == pid {
                post.deleted = true;
            }
        }
        self
    }

    pub fn pids(&self) -> Vec<PostId> {
        self.posts.iter().map(|p| p.pid).collect()
    }

    /// `(pid, tid)` pairs for rank resolution.
    pub fn pairs(&self) -> Vec<(PostId, TopicId)> {
        self.posts.iter().map(|p| (p.pid, p.tid)).collect()
    }

    pub fn time_key(&self) -> SetKey {
        SetKey::topic_posts(self.tid)
    }

    pub fn votes_key(&self) -> SetKey {
        SetKey::topic_votes(self.tid)
    }

    /// Write both ordering sets and every post record.
    pub async fn seed<S: StoreWriter + ?Sized>(&self, store: &S) -> agora_store::Result<()> {
        let time_key = self.time_key();
        let votes_key = self.votes_key();
        for post in &self.posts {
            store.add_to_set(&time_key, post.timestamp as f64, post.pid).await?;
            store.add_to_set(&votes_key, post.votes as f64, post.pid).await?;
            store.put_post(post).await?;
        }
        Ok(())
    }

    /// Record the category of every post in a grant table.
    pub fn assign(&self, table: &mut GrantTable) {
        for post in &self.posts {
            table.assign_post(post.pid, self.cid);
        }
    }
}

/// A memory store seeded with every topic.
pub async fn seeded_store(topics: &[TopicFixture]) -> MemoryStore {
    let store = MemoryStore::new();
    for topic in topics {
        topic.seed(&store).await.expect("seeding a memory store cannot fail");
    }
    store
}

/// A grant table knowing the category of every post.
pub fn grant_table(topics: &[TopicFixture]) -> GrantTable {
    let mut table = GrantTable::new();
    for topic in topics {
        topic.assign(&mut table);
    }
    table
}
