use crate::twitch::Stream;
use std::cmp::Reverse;

pub const TOP_CHANNELS: usize = 10;

/// Row data persisted for one of the most watched channels.
#[derive(Debug, Clone, PartialEq)]
pub struct TopChannel {
    pub channel_name: String,
    pub user_login: String,
    pub viewer_count: u32,
    pub user_name: String,
    pub title: String,
    pub started_at: String,
    pub language: String,
    pub thumbnail_url: String,
}

impl From<&Stream> for TopChannel {
    fn from(stream: &Stream) -> Self {
        Self {
            channel_name: stream.user_name.clone(),
            user_login: stream.user_login.clone(),
            viewer_count: stream.viewer_count,
            user_name: stream.user_name.clone(),
            title: stream.title.clone(),
            started_at: stream.started_at.clone(),
            language: stream.language.clone(),
            thumbnail_url: stream.thumbnail_url.clone(),
        }
    }
}

/// Aggregate viewership for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub total_viewers: u64,
    pub top_channels: Vec<TopChannel>,
}

impl Snapshot {
    pub fn from_streams(streams: &[Stream]) -> Self {
        Self {
            total_viewers: total_viewers(streams),
            top_channels: top_channels(streams, TOP_CHANNELS)
                .into_iter()
                .map(TopChannel::from)
                .collect(),
        }
    }
}

pub fn total_viewers(streams: &[Stream]) -> u64 {
    streams.iter().map(|s| u64::from(s.viewer_count)).sum()
}

/// The `k` streams with the most viewers, highest first. Equal counts keep
/// their input order.
pub fn top_channels(streams: &[Stream], k: usize) -> Vec<&Stream> {
    let mut ranked: Vec<&Stream> = streams.iter().collect();
    ranked.sort_by_key(|s| Reverse(s.viewer_count));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(login: &str, viewers: u32) -> Stream {
        Stream {
            id: format!("{}-stream", login),
            user_id: format!("{}-id", login),
            user_login: login.to_string(),
            user_name: login.to_uppercase(),
            game_id: "511224".to_string(),
            title: format!("{} title", login),
            viewer_count: viewers,
            started_at: "2025-03-01T12:30:00Z".to_string(),
            language: "en".to_string(),
            thumbnail_url: String::new(),
        }
    }

    fn logins(streams: &[&Stream]) -> Vec<String> {
        streams.iter().map(|s| s.user_login.clone()).collect()
    }

    #[test]
    fn test_total_and_top_one() {
        let streams = vec![stream("a", 50), stream("b", 200), stream("c", 10)];

        assert_eq!(total_viewers(&streams), 260);
        assert_eq!(logins(&top_channels(&streams, 1)), vec!["b"]);
    }

    #[test]
    fn test_empty_input() {
        let snapshot = Snapshot::from_streams(&[]);
        assert_eq!(snapshot.total_viewers, 0);
        assert!(snapshot.top_channels.is_empty());
    }

    #[test]
    fn test_fewer_than_k_returns_all_sorted() {
        let streams = vec![stream("a", 5), stream("b", 7), stream("c", 6)];
        assert_eq!(logins(&top_channels(&streams, TOP_CHANNELS)), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let streams = vec![
            stream("a", 10),
            stream("b", 30),
            stream("c", 10),
            stream("d", 30),
            stream("e", 10),
        ];

        assert_eq!(logins(&top_channels(&streams, 3)), vec!["b", "d", "a"]);
    }

    #[test]
    fn test_top_k_dominates_excluded() {
        let streams: Vec<Stream> = (0..40u32)
            .map(|i| stream(&format!("s{}", i), (i * 7919) % 101))
            .collect();

        let top = top_channels(&streams, TOP_CHANNELS);
        assert_eq!(top.len(), TOP_CHANNELS);

        let floor = top.iter().map(|s| s.viewer_count).min().unwrap();
        let excluded = streams
            .iter()
            .filter(|s| !top.iter().any(|t| t.user_login == s.user_login));
        for s in excluded {
            assert!(s.viewer_count <= floor);
        }
        assert!(top.windows(2).all(|w| w[0].viewer_count >= w[1].viewer_count));
    }

    #[test]
    fn test_input_is_untouched() {
        let streams = vec![stream("a", 1), stream("b", 2)];
        let before = streams.clone();
        let _ = Snapshot::from_streams(&streams);
        assert_eq!(streams, before);
    }

    #[test]
    fn test_top_channel_projection() {
        let snapshot = Snapshot::from_streams(&[stream("wraith", 42)]);
        let top = &snapshot.top_channels[0];

        assert_eq!(top.channel_name, "WRAITH");
        assert_eq!(top.user_name, "WRAITH");
        assert_eq!(top.user_login, "wraith");
        assert_eq!(top.viewer_count, 42);
        assert_eq!(top.title, "wraith title");
    }
}
