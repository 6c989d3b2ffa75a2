//! Proptest generators for property-based testing.

use proptest::prelude::*;

use agora_core::{PostId, SortMode, TopicId};

use crate::fixtures::TopicFixture;

/// Generate a sort mode.
pub fn sort_mode() -> impl Strategy<Value = SortMode> {
    prop_oneof![
        Just(SortMode::OldestToNewest),
        Just(SortMode::NewestToOldest),
        Just(SortMode::MostVotes),
    ]
}

/// Generate a valid post id.
pub fn post_id() -> impl Strategy<Value = PostId> {
    (1u64..=1_000_000).prop_map(|n| PostId::new(n).expect("range excludes zero"))
}

/// Generate a forum of up to `max_topics` topics with up to `max_posts`
/// posts each.
///
/// Post ids are unique across the forum; vote scores are small so ties are
/// common.
pub fn forum(max_topics: usize, max_posts: usize) -> impl Strategy<Value = Vec<TopicFixture>> {
    prop::collection::vec(prop::collection::vec(-3i64..=3, 0..=max_posts), 1..=max_topics).prop_map(
        |topics| {
            let mut next_pid = 1u64;
            topics
                .into_iter()
                .enumerate()
                .map(|(i, votes)| {
                    let pids: Vec<u64> = (next_pid..next_pid + votes.len() as u64).collect();
                    next_pid += votes.len() as u64;
                    TopicFixture::new(i as u64 + 1, &pids).with_votes(&votes)
                })
                .collect()
        },
    )
}

/// Pick `(pid, tid)` lookups from a forum, some of them pointing at the
/// wrong topic or at unknown posts.
pub fn lookups(
    forum: &[TopicFixture],
    max_len: usize,
) -> impl Strategy<Value = Vec<(PostId, TopicId)>> {
    let topics: Vec<TopicId> = forum.iter().map(|t| t.tid).collect();
    let known: Vec<(PostId, TopicId)> = forum.iter().flat_map(TopicFixture::pairs).collect();
    let topic_count = topics.len();

    let pick = (any::<prop::sample::Index>(), 0usize..4, post_id());
    prop::collection::vec(pick, 0..=max_len).prop_map(move |picks| {
        picks
            .into_iter()
            .map(|(index, kind, stray)| match kind {
                0 if !known.is_empty() => {
                    let (pid, _) = known[index.index(known.len())];
                    (pid, topics[index.index(topic_count)])
                }
                3 => (stray, topics[index.index(topic_count)]),
                _ if !known.is_empty() => known[index.index(known.len())],
                _ => (stray, topics[index.index(topic_count)]),
            })
            .collect()
    })
}
