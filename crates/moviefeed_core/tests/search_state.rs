use moviefeed_core::{
    validate, CatalogItem, SearchPhase, SearchStart, SearchState, SettledKind,
};
use pretty_assertions::assert_eq;

fn start(state: &mut SearchState, raw: &str) -> (u64, SearchStart) {
    let generation = state.input_changed(raw);
    let validation = validate(state.query_for(generation).unwrap());
    (generation, state.begin_search(generation, &validation))
}

#[test]
fn input_moves_to_pending_validation() {
    let mut state = SearchState::new();
    let generation = state.input_changed("bat");

    assert_eq!(state.phase(), SearchPhase::PendingValidation);
    assert_eq!(state.query_for(generation), Some("bat"));
    assert_eq!(state.query(), "bat");
}

#[test]
fn newer_input_supersedes_older_generation() {
    let mut state = SearchState::new();
    let old = state.input_changed("ba");
    let new = state.input_changed("bat");

    assert_eq!(state.query_for(old), None);
    assert_eq!(state.begin_search(old, &validate("ba")), SearchStart::Stale);
    assert_eq!(
        state.begin_search(new, &validate("bat")),
        SearchStart::Fetch("bat".to_string())
    );
}

#[test]
fn valid_query_records_last_valid_and_loads() {
    let mut state = SearchState::new();
    let (_, start) = start(&mut state, "  heat ");

    assert_eq!(start, SearchStart::Fetch("heat".to_string()));
    assert_eq!(state.last_valid_query(), Some("heat"));
    assert!(state.is_loading());
    assert_eq!(state.phase(), SearchPhase::Searching);
}

#[test]
fn invalid_query_clears_results_without_fetch() {
    let mut state = SearchState::new();
    let (generation, _) = start(&mut state, "heat");
    state.finish_search(generation, Ok(vec![CatalogItem::new(1, "Heat")]));

    let (_, start) = start(&mut state, " h ");

    assert!(matches!(start, SearchStart::Rejected(ref v) if !v.is_valid));
    assert!(state.results().is_empty());
    assert_eq!(state.phase(), SearchPhase::Idle);
    let view = state.view();
    assert!(view.validation_message.is_some());
    assert_eq!(view.error_message, None);
    assert_eq!(view.last_valid_query.as_deref(), Some("heat"));
}

#[test]
fn results_empty_and_failure_are_distinct() {
    let mut state = SearchState::new();

    let (generation, _) = start(&mut state, "heat");
    let kind = state.finish_search(generation, Ok(vec![CatalogItem::new(1, "Heat")]));
    assert_eq!(kind, Some(SettledKind::Results));
    assert_eq!(state.results().len(), 1);

    let (generation, _) = start(&mut state, "zzzznonexistentmovie");
    let kind = state.finish_search(generation, Ok(Vec::new()));
    assert_eq!(kind, Some(SettledKind::Empty));
    assert!(state.view().is_empty_result());
    assert_eq!(state.view().error_message, None);

    let (generation, _) = start(&mut state, "heat");
    state.finish_search(generation, Ok(vec![CatalogItem::new(1, "Heat")]));
    let (generation, _) = start(&mut state, "alien");
    let kind = state.finish_search(generation, Err("network error".to_string()));
    assert_eq!(kind, Some(SettledKind::Error));
    assert!(state.results().is_empty());
    assert_eq!(state.view().error_message.as_deref(), Some("network error"));
    assert!(!state.view().is_empty_result());
}

#[test]
fn stale_result_is_discarded() {
    let mut state = SearchState::new();
    let (old, _) = start(&mut state, "alien");
    let (new, _) = start(&mut state, "aliens");

    assert_eq!(
        state.finish_search(old, Ok(vec![CatalogItem::new(1, "Alien")])),
        None
    );
    assert!(state.results().is_empty());
    assert!(state.is_loading());

    state.finish_search(new, Ok(vec![CatalogItem::new(2, "Aliens")]));
    assert_eq!(state.results()[0].title, "Aliens");
}

#[test]
fn supersede_invalidates_outstanding_search() {
    let mut state = SearchState::new();
    let (generation, _) = start(&mut state, "alien");

    state.supersede();

    assert!(!state.is_loading());
    assert_eq!(state.phase(), SearchPhase::Idle);
    assert_eq!(state.finish_search(generation, Ok(Vec::new())), None);
}
