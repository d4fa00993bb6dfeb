//! Threaded comment tree built from a post's flat comment sequence.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use super::post::Comment;

/// Reply depth at which subtrees are rendered collapsed by default.
/// Roots sit at depth 0. Presentation hint only, not a data invariant.
pub const REPLY_COLLAPSE_DEPTH: usize = 3;

/// A comment plus its ordered replies, ready for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
    pub collapsed: bool,
}

/// Build a rooted forest from a flat comment sequence.
///
/// A comment whose `parent_id` does not resolve to another comment in the
/// sequence (or points at itself) is promoted to a root rather than dropped.
/// Sibling order follows the flat-sequence order.
pub fn build_comment_tree(comments: &[Comment]) -> Vec<CommentNode> {
    let ids: HashSet<Uuid> = comments.iter().map(|c| c.id).collect();

    let mut roots: Vec<usize> = Vec::new();
    let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();
    for (idx, comment) in comments.iter().enumerate() {
        match comment.parent_id {
            Some(parent) if parent != comment.id && ids.contains(&parent) => {
                children.entry(parent).or_default().push(idx);
            }
            _ => roots.push(idx),
        }
    }

    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut forest: Vec<CommentNode> = roots
        .into_iter()
        .filter_map(|idx| build_node(comments, &children, &mut visited, idx, 0))
        .collect();

    // Comments stranded by a reference cycle are unreachable from any root.
    // The append-only model cannot produce cycles, but malformed input must
    // not silently lose comments: promote survivors to roots in order.
    if visited.len() < comments.len() {
        for (idx, comment) in comments.iter().enumerate() {
            if !visited.contains(&comment.id) {
                if let Some(node) = build_node(comments, &children, &mut visited, idx, 0) {
                    forest.push(node);
                }
            }
        }
    }

    forest
}

fn build_node(
    comments: &[Comment],
    children: &HashMap<Uuid, Vec<usize>>,
    visited: &mut HashSet<Uuid>,
    idx: usize,
    depth: usize,
) -> Option<CommentNode> {
    let comment = &comments[idx];
    if !visited.insert(comment.id) {
        return None;
    }

    let replies = children
        .get(&comment.id)
        .map(|child_idxs| {
            child_idxs
                .iter()
                .filter_map(|&child| build_node(comments, children, visited, child, depth + 1))
                .collect()
        })
        .unwrap_or_default();

    Some(CommentNode {
        comment: comment.clone(),
        replies,
        collapsed: depth >= REPLY_COLLAPSE_DEPTH,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: u128, parent: Option<u128>) -> Comment {
        Comment {
            id: Uuid::from_u128(id),
            parent_id: parent.map(Uuid::from_u128),
            user_email: "a@x.com".into(),
            text: format!("comment {id}"),
            date: chrono::Utc::now(),
            votes: 0,
            voters: Vec::new(),
        }
    }

    #[test]
    fn chain_builds_single_depth_three_path() {
        let comments = vec![comment(1, None), comment(2, Some(1)), comment(3, Some(2))];
        let tree = build_comment_tree(&comments);

        assert_eq!(tree.len(), 1);
        let root = &tree[0];
        assert_eq!(root.comment.id, Uuid::from_u128(1));
        assert_eq!(root.replies.len(), 1);
        assert_eq!(root.replies[0].comment.id, Uuid::from_u128(2));
        assert_eq!(root.replies[0].replies[0].comment.id, Uuid::from_u128(3));
        assert!(root.replies[0].replies[0].replies.is_empty());
    }

    #[test]
    fn dangling_parent_is_promoted_to_root() {
        let comments = vec![comment(1, None), comment(2, Some(99))];
        let tree = build_comment_tree(&comments);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[1].comment.id, Uuid::from_u128(2));
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn sibling_order_is_stable() {
        let comments = vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, None),
            comment(4, Some(1)),
            comment(5, Some(1)),
        ];
        let tree = build_comment_tree(&comments);

        assert_eq!(tree.len(), 2);
        let reply_ids: Vec<u128> = tree[0]
            .replies
            .iter()
            .map(|n| n.comment.id.as_u128())
            .collect();
        assert_eq!(reply_ids, vec![2, 4, 5]);
        assert_eq!(tree[1].comment.id, Uuid::from_u128(3));
    }

    #[test]
    fn deep_replies_are_marked_collapsed() {
        let comments = vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(2)),
            comment(4, Some(3)),
            comment(5, Some(4)),
        ];
        let tree = build_comment_tree(&comments);

        let mut node = &tree[0];
        let mut depth = 0;
        loop {
            assert_eq!(node.collapsed, depth >= REPLY_COLLAPSE_DEPTH);
            if node.replies.is_empty() {
                break;
            }
            node = &node.replies[0];
            depth += 1;
        }
        assert_eq!(depth, 4);
    }

    #[test]
    fn self_reference_becomes_root() {
        let comments = vec![comment(1, Some(1))];
        let tree = build_comment_tree(&comments);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].replies.is_empty());
    }

    #[test]
    fn reference_cycle_does_not_lose_comments() {
        // 2 and 3 reference each other; impossible via the API but the
        // builder must still terminate and keep every comment.
        let comments = vec![comment(1, None), comment(2, Some(3)), comment(3, Some(2))];
        let tree = build_comment_tree(&comments);

        let mut count = 0;
        let mut stack: Vec<&CommentNode> = tree.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.replies.iter());
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn empty_sequence_builds_empty_forest() {
        assert!(build_comment_tree(&[]).is_empty());
    }
}
