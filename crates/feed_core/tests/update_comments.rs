mod support;

use feed_core::{update, Effect, FeedError, Msg, OpToken, Operation, COMMENT_PAGE_SIZE};
use pretty_assertions::assert_eq;

use support::{comment, init_logging, post, store_with_posts};

fn comments_token(effects: &[Effect]) -> (OpToken, u32) {
    match effects {
        [Effect::FetchComments {
            token,
            page_count,
            page_size,
            ..
        }] => {
            assert_eq!(*page_size, COMMENT_PAGE_SIZE);
            (*token, *page_count)
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

fn finished(post_id: i64, result: Result<(), FeedError>) -> Vec<Effect> {
    vec![Effect::OperationFinished {
        operation: Operation::Comments { post_id },
        result,
    }]
}

#[test]
fn page_count_rounds_up() {
    init_logging();
    let state = store_with_posts(vec![post(1, 40), post(2, 41), post(3, 1)]);

    let (state, effects) = update(state, Msg::RetrieveComments { post_id: 1 });
    assert_eq!(comments_token(&effects).1, 1);
    let (state, effects) = update(state, Msg::RetrieveComments { post_id: 2 });
    assert_eq!(comments_token(&effects).1, 2);
    let (_, effects) = update(state, Msg::RetrieveComments { post_id: 3 });
    assert_eq!(comments_token(&effects).1, 1);
}

#[test]
fn post_without_comments_finishes_immediately() {
    init_logging();
    let state = store_with_posts(vec![post(1, 0)]);
    let (_, effects) = update(state, Msg::RetrieveComments { post_id: 1 });
    assert_eq!(effects, finished(1, Ok(())));
}

#[test]
fn fetched_comments_are_attached_as_a_tree() {
    init_logging();
    let state = store_with_posts(vec![post(1, 4)]);
    let (state, effects) = update(state, Msg::RetrieveComments { post_id: 1 });
    let (token, _) = comments_token(&effects);

    let (state, effects) = update(
        state,
        Msg::CommentsFetched {
            token,
            result: Ok(vec![
                comment(3, "0.1.3"),
                comment(4, "0.4"),
                comment(1, "0.1"),
                comment(2, "0.1.2"),
            ]),
        },
    );
    assert_eq!(effects, finished(1, Ok(())));

    let forest = state.comments(1).expect("post known");
    let roots: Vec<_> = forest.roots().map(|n| n.comment().id).collect();
    assert_eq!(roots, vec![4, 1]);
    assert_eq!(forest.get(1).unwrap().child_count(), 2);
    assert_eq!(state.post_rows(&[1])[0].attached_comments, 4);
}

#[test]
fn unknown_post_is_reported_not_fetched() {
    init_logging();
    let state = store_with_posts(vec![post(1, 4)]);
    let (_, effects) = update(state, Msg::RetrieveComments { post_id: 99 });
    assert_eq!(effects, finished(99, Err(FeedError::UnknownPost(99))));
}

#[test]
fn clear_during_fetch_reports_unknown_post() {
    init_logging();
    let state = store_with_posts(vec![post(1, 4)]);
    let (state, effects) = update(state, Msg::RetrieveComments { post_id: 1 });
    let (token, _) = comments_token(&effects);

    let (state, _) = update(state, Msg::ClearStore);
    let (state, effects) = update(
        state,
        Msg::CommentsFetched {
            token,
            result: Ok(vec![comment(1, "0.1")]),
        },
    );
    assert_eq!(effects, finished(1, Err(FeedError::UnknownPost(1))));
    assert!(state.comments(1).is_none());
}

#[test]
fn duplicate_comment_request_is_rejected() {
    init_logging();
    let state = store_with_posts(vec![post(1, 4)]);
    let (state, _) = update(state, Msg::RetrieveComments { post_id: 1 });
    let (_, effects) = update(state, Msg::RetrieveComments { post_id: 1 });
    assert_eq!(
        effects,
        finished(1, Err(FeedError::AlreadyInProgress("comments:1".to_string())))
    );
}

#[test]
fn transport_failure_leaves_forest_untouched_and_allows_retry() {
    init_logging();
    let state = store_with_posts(vec![post(1, 4)]);
    let (state, effects) = update(state, Msg::RetrieveComments { post_id: 1 });
    let (token, _) = comments_token(&effects);

    let failure = FeedError::Transport("http status 502".to_string());
    let (state, effects) = update(
        state,
        Msg::CommentsFetched {
            token,
            result: Err(failure.clone()),
        },
    );
    assert_eq!(effects, finished(1, Err(failure)));
    assert!(state.comments(1).unwrap().is_empty());

    let (_, effects) = update(state, Msg::RetrieveComments { post_id: 1 });
    comments_token(&effects);
}

#[test]
fn refetching_comments_does_not_duplicate_nodes() {
    init_logging();
    let mut state = store_with_posts(vec![post(1, 2)]);
    for _ in 0..2 {
        let (next, effects) = update(state, Msg::RetrieveComments { post_id: 1 });
        let (token, _) = comments_token(&effects);
        let (next, _) = update(
            next,
            Msg::CommentsFetched {
                token,
                result: Ok(vec![comment(1, "0.1"), comment(2, "0.1.2")]),
            },
        );
        state = next;
    }
    assert_eq!(state.comments(1).unwrap().len(), 2);
}
