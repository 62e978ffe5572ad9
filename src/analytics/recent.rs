//! Bounded recent-click log
//!
//! Every store backend goes through `push_recent_click`, so the truncation
//! policy is the same whether the log lives in memory or on disk.

use std::collections::VecDeque;

use super::ClickEvent;

/// Append `event` (most recent last) and drop the oldest entries beyond `cap`.
pub fn push_recent_click(log: &mut VecDeque<ClickEvent>, event: ClickEvent, cap: usize) {
    log.push_back(event);
    while log.len() > cap {
        log.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_sixty_clicks_keep_fifty_most_recent() {
        let start = Utc::now();
        let mut log = VecDeque::new();
        for i in 0..60 {
            push_recent_click(&mut log, ClickEvent::at(start + Duration::seconds(i)), 50);
        }

        assert_eq!(log.len(), 50);
        assert_eq!(log.front().unwrap().timestamp, start + Duration::seconds(10));
        assert_eq!(log.back().unwrap().timestamp, start + Duration::seconds(59));
        assert!(
            log.iter()
                .zip(log.iter().skip(1))
                .all(|(a, b)| a.timestamp < b.timestamp)
        );
    }

    #[test]
    fn test_under_cap_keeps_everything() {
        let mut log = VecDeque::new();
        push_recent_click(&mut log, ClickEvent::new(), 3);
        push_recent_click(&mut log, ClickEvent::new(), 3);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_cap_shrink_trims_backlog() {
        let mut log: VecDeque<ClickEvent> = (0..10).map(|_| ClickEvent::new()).collect();
        push_recent_click(&mut log, ClickEvent::new(), 4);
        assert_eq!(log.len(), 4);
    }
}
