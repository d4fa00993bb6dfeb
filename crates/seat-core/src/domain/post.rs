use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of flipping a voter's membership in a target's voter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The voter was not in the set; it was added and the count incremented.
    Cast,
    /// The voter was in the set; it was removed and the count decremented.
    Withdrawn,
}

impl VoteOutcome {
    pub fn upvoted(self) -> bool {
        matches!(self, VoteOutcome::Cast)
    }
}

/// Post entity - a project idea submitted for community critique.
///
/// Invariant: `votes` always equals `voters.len()`, and a voter email
/// appears at most once in `voters`. Comments are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub user_email: String,
    pub date: DateTime<Utc>,
    pub votes: i64,
    pub voters: Vec<String>,
    pub comments: Vec<Comment>,
}

impl Post {
    /// Create a new post with generated ID, zero votes and no comments.
    pub fn new(title: String, description: String, user_email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            user_email,
            date: Utc::now(),
            votes: 0,
            voters: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Flip `voter`'s membership in this post's voter set.
    pub fn toggle_vote(&mut self, voter: &str) -> VoteOutcome {
        toggle(&mut self.votes, &mut self.voters, voter)
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    pub fn comment_mut(&mut self, comment_id: Uuid) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| c.id == comment_id)
    }
}

/// Comment entity - lives embedded in its post's comment sequence.
///
/// `parent_id == None` marks a root comment; otherwise it references an
/// earlier comment in the same post. Immutable once created except for its
/// vote state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub user_email: String,
    pub text: String,
    pub date: DateTime<Utc>,
    pub votes: i64,
    pub voters: Vec<String>,
}

impl Comment {
    /// Create a new root comment.
    pub fn new(user_email: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: None,
            user_email,
            text,
            date: Utc::now(),
            votes: 0,
            voters: Vec::new(),
        }
    }

    /// Create a reply to an existing comment.
    pub fn reply(parent_id: Uuid, user_email: String, text: String) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::new(user_email, text)
        }
    }

    /// Flip `voter`'s membership in this comment's voter set.
    pub fn toggle_vote(&mut self, voter: &str) -> VoteOutcome {
        toggle(&mut self.votes, &mut self.voters, voter)
    }
}

fn toggle(votes: &mut i64, voters: &mut Vec<String>, voter: &str) -> VoteOutcome {
    if let Some(pos) = voters.iter().position(|v| v == voter) {
        voters.remove(pos);
        *votes -= 1;
        VoteOutcome::Withdrawn
    } else {
        voters.push(voter.to_string());
        *votes += 1;
        VoteOutcome::Cast
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Post {
        Post::new(
            "Solar kiosk".into(),
            "Off-grid charging stations".into(),
            "owner@example.com".into(),
        )
    }

    #[test]
    fn toggle_parity_on_post() {
        let mut p = post();

        assert_eq!(p.toggle_vote("a@x.com"), VoteOutcome::Cast);
        assert_eq!(p.votes, 1);
        assert!(p.voters.contains(&"a@x.com".to_string()));

        assert_eq!(p.toggle_vote("a@x.com"), VoteOutcome::Withdrawn);
        assert_eq!(p.votes, 0);
        assert!(p.voters.is_empty());

        // Odd number of toggles leaves the voter in the set, net +1.
        for _ in 0..3 {
            p.toggle_vote("a@x.com");
        }
        assert_eq!(p.votes, 1);
        assert_eq!(p.voters, vec!["a@x.com".to_string()]);
    }

    #[test]
    fn count_tracks_voter_set_exactly() {
        let mut p = post();
        for voter in ["a@x.com", "b@x.com", "a@x.com", "c@x.com", "b@x.com"] {
            p.toggle_vote(voter);
            assert_eq!(p.votes as usize, p.voters.len());
        }
        assert_eq!(p.voters, vec!["c@x.com".to_string()]);
    }

    #[test]
    fn comment_votes_are_independent() {
        let mut p = post();
        p.comments.push(Comment::new("a@x.com".into(), "first".into()));
        p.comments.push(Comment::new("b@x.com".into(), "second".into()));

        let first = p.comments[0].id;
        p.comment_mut(first).unwrap().toggle_vote("c@x.com");

        assert_eq!(p.comments[0].votes, 1);
        assert_eq!(p.comments[1].votes, 0);
        assert_eq!(p.votes, 0);
    }

    #[test]
    fn no_duplicate_voter_entries() {
        let mut p = post();
        p.toggle_vote("a@x.com");
        p.toggle_vote("b@x.com");
        p.toggle_vote("a@x.com");
        p.toggle_vote("a@x.com");
        let dups = p.voters.iter().filter(|v| *v == "a@x.com").count();
        assert_eq!(dups, 1);
        assert_eq!(p.votes, 2);
    }
}
