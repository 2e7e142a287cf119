use chrono::NaiveDate;
use cp_common::{CommonError, DashboardConfig, FetchResponse, SubmissionRecord, GENERIC_FETCH_ERROR};
use dashboard_wasm::{Dashboard, DashboardError, EmptyState, FetchOutcome};
use std::collections::BTreeSet;
use submission_filter::{FilterCriteria, FilterError, SortDirection, SortField, SortSpec};
use submission_stats::{GeometrySnapshot, ItemPosition, ManualClock, ViewportGeometry};

fn at(y: i32, m: u32, d: u32) -> i64 {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp()
}

fn record(id: &str, rating: Option<i32>, tags: &str, language: &str, time: i64) -> SubmissionRecord {
    SubmissionRecord {
        problem_id: id.to_string(),
        problem_name: Some(format!("Problem {}", id)),
        contest_id: Some(1850),
        problem_index: Some("A".to_string()),
        problem_rating: rating,
        problem_tags: tags.to_string(),
        language: language.to_string(),
        creation_time_seconds: time,
    }
}

fn sample() -> Vec<SubmissionRecord> {
    vec![
        record("1A", Some(900), "math, greedy", "GNU C++17", at(2024, 1, 2)),
        record("2B", Some(1150), "dp", "Python 3", at(2024, 1, 5)),
        record("3C", None, "graphs, dp", "GNU C++17", at(2024, 2, 1)),
        record("4D", Some(2450), "math", "Rust", at(2023, 7, 14)),
    ]
}

fn dashboard() -> Dashboard<ManualClock> {
    Dashboard::with_clock(DashboardConfig::default(), ManualClock::new(0)).unwrap()
}

fn loaded(records: Vec<SubmissionRecord>) -> Dashboard<ManualClock> {
    let mut dashboard = dashboard();
    let ticket = dashboard.begin_fetch("tourist").unwrap();
    dashboard.complete_fetch(ticket, Ok(records), &mut GeometrySnapshot::default());
    dashboard
}

// 年份列表首尾各留一项高度的空白
fn widget(count: usize) -> GeometrySnapshot {
    let items = (0..count)
        .map(|i| ItemPosition {
            offset_top: 40.0 + i as f64 * 40.0,
            height: 40.0,
        })
        .collect();
    GeometrySnapshot::new(ViewportGeometry { scroll_top: 0.0, height: 120.0 }, items)
}

#[test]
fn test_empty_handle_is_rejected_and_clears_state() {
    let mut dashboard = loaded(sample());
    dashboard.set_filters(FilterCriteria {
        min_rating: Some(1000),
        ..Default::default()
    });

    let err = dashboard.begin_fetch("   ").unwrap_err();

    assert!(matches!(err, DashboardError::EmptyHandle));
    assert!(!dashboard.is_loading());
    assert_eq!(dashboard.error(), Some("Codeforces handle cannot be empty."));
    assert!(dashboard.records().is_empty());
    assert_eq!(dashboard.criteria(), &FilterCriteria::default());
    assert_eq!(dashboard.page_state().current_page, 1);
    assert!(dashboard.year_view().available_years.is_empty());
    assert_eq!(dashboard.year_view().selected_display, "N/A");
    assert!(dashboard.charts().tags.is_empty());
    assert_eq!(dashboard.list_view().empty_state, Some(EmptyState::NoSolvedProblems));
}

#[test]
fn test_empty_fetch_shows_no_solved_problems() {
    let mut dashboard = dashboard();
    let ticket = dashboard.begin_fetch("newbie").unwrap();
    let outcome = dashboard.complete_fetch(ticket, Ok(Vec::new()), &mut GeometrySnapshot::default());

    assert_eq!(outcome, FetchOutcome::Empty);
    let view = dashboard.list_view();
    assert!(view.items.is_empty());
    assert_eq!(view.total_pages, 0);
    assert_eq!(view.empty_state, Some(EmptyState::NoSolvedProblems));
    assert_eq!(dashboard.error(), None);
}

#[test]
fn test_filters_excluding_everything_show_no_matches() {
    let mut dashboard = loaded(sample());
    dashboard.set_filters(FilterCriteria {
        min_rating: Some(3500),
        ..Default::default()
    });

    let view = dashboard.list_view();
    assert!(view.items.is_empty());
    assert_eq!(view.empty_state, Some(EmptyState::NoMatchingProblems));
    assert_eq!(
        view.empty_message,
        Some("No problems match your current filters. Try adjusting your filter criteria.")
    );
}

#[test]
fn test_default_order_is_newest_first_and_cards_are_rendered() {
    let dashboard = loaded(sample());
    let view = dashboard.list_view();

    let ids: Vec<&str> = view.items.iter().map(|c| c.problem_id.as_str()).collect();
    assert_eq!(ids, vec!["3C", "2B", "1A", "4D"]);

    let card = &view.items[0];
    assert_eq!(card.rating, "N/A");
    assert_eq!(card.date, "2024-02-01");
    assert_eq!(card.tags, vec!["graphs", "dp"]);
    assert_eq!(card.url.as_deref(), Some("https://codeforces.com/problemset/problem/1850/A"));
}

#[test]
fn test_pagination_and_page_reset_on_filter_change() {
    let records: Vec<_> = (0..120)
        .map(|i| record(&format!("{}A", i), Some(800 + i as i32), "math", "Rust", 1_700_000_000 + i))
        .collect();
    let mut dashboard = loaded(records);

    assert_eq!(dashboard.total_pages(), 3);
    assert_eq!(dashboard.list_view().items.len(), 50);

    dashboard.go_to_page(3).unwrap();
    let view = dashboard.list_view();
    assert_eq!(view.items.len(), 20);
    assert!(view.has_previous);
    assert!(!view.has_next);

    let err = dashboard.go_to_page(4).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::Filter(FilterError::PageOutOfRange { requested: 4, total_pages: 3 })
    ));
    assert_eq!(dashboard.page_state().current_page, 3);
    assert!(dashboard.next_page().is_err());

    dashboard.set_sort(SortSpec::new(SortField::ProblemRating, SortDirection::Asc));
    assert_eq!(dashboard.page_state().current_page, 1);

    dashboard.go_to_page(2).unwrap();
    dashboard.set_filters(FilterCriteria::default());
    assert_eq!(dashboard.page_state().current_page, 1);
    assert!(dashboard.previous_page().is_err());
}

#[test]
fn test_aggregates_ignore_filters() {
    let mut dashboard = loaded(sample());
    let before = dashboard.charts();

    dashboard.set_filters(FilterCriteria {
        tags: ["graphs".to_string()].into_iter().collect::<BTreeSet<_>>(),
        ..Default::default()
    });
    assert_eq!(dashboard.list_view().total, 1);
    assert_eq!(dashboard.charts(), before);

    assert_eq!(before.ratings.values.iter().sum::<usize>(), 3);
    assert_eq!(before.languages.labels, vec!["GNU C++17", "Python 3", "Rust"]);
    assert_eq!(before.tags.labels[..2], ["math".to_string(), "dp".to_string()]);
    assert_eq!(before.weekly.labels, vec!["W1", "W5"]);
    assert_eq!(before.weekly.values, vec![2, 1]);
}

#[test]
fn test_failed_fetch_clears_state() {
    let mut dashboard = loaded(sample());
    let ticket = dashboard.begin_fetch("tourist").unwrap();
    assert!(dashboard.is_loading());
    // 请求进行中时旧状态保持可见
    assert_eq!(dashboard.records().len(), 4);

    let response = FetchResponse::from_json(r#"{"status": "Error", "message": "handle: User not found"}"#).unwrap();
    let outcome = dashboard.complete_fetch(ticket, response.into_result(), &mut GeometrySnapshot::default());

    assert_eq!(
        outcome,
        FetchOutcome::Failed {
            message: "handle: User not found".to_string()
        }
    );
    assert!(!dashboard.is_loading());
    assert_eq!(dashboard.error(), Some("handle: User not found"));
    assert!(dashboard.records().is_empty());
    assert!(dashboard.year_view().available_years.is_empty());
    assert!(dashboard.charts().weekly.is_empty());
    assert_eq!(dashboard.list_view().empty_state, Some(EmptyState::NoSolvedProblems));
}

#[test]
fn test_stale_response_is_ignored() {
    let mut dashboard = dashboard();
    let first = dashboard.begin_fetch("alice").unwrap();
    let second = dashboard.begin_fetch("bob").unwrap();

    let mut scroller = widget(2);
    let outcome = dashboard.complete_fetch(second, Ok(sample()), &mut scroller);
    assert_eq!(outcome, FetchOutcome::Loaded { count: 4 });

    let stale = dashboard.complete_fetch(
        first,
        Err(CommonError::DataSource("timeout".to_string())),
        &mut scroller,
    );
    assert_eq!(stale, FetchOutcome::Stale);
    assert_eq!(dashboard.records().len(), 4);
    assert_eq!(dashboard.error(), None);
}

#[test]
fn test_replace_collection_resets_filters_and_keeps_valid_year() {
    let mut dashboard = loaded(sample());
    let mut scroller = widget(2);

    dashboard.select_year(2023, &mut scroller).unwrap();
    dashboard.set_filters(FilterCriteria {
        language: Some("Rust".to_string()),
        ..Default::default()
    });
    assert_eq!(dashboard.charts().weekly.title, "Solved Problems per Week (2023)");

    let ticket = dashboard.begin_fetch("tourist").unwrap();
    dashboard.complete_fetch(ticket, Ok(sample()), &mut scroller);

    assert_eq!(dashboard.criteria(), &FilterCriteria::default());
    assert_eq!(dashboard.sort(), &SortSpec::default());
    assert_eq!(dashboard.list_view().total, 4);
    assert_eq!(dashboard.year_view().selected_year, Some(2023));

    let ticket = dashboard.begin_fetch("tourist").unwrap();
    dashboard.complete_fetch(ticket, Ok(sample()[..3].to_vec()), &mut scroller);
    assert_eq!(dashboard.year_view().available_years, vec![2024]);
    assert_eq!(dashboard.year_view().selected_year, Some(2024));
}

#[test]
fn test_year_selection_and_debounced_emphasis() {
    let clock = ManualClock::new(0);
    let mut dashboard = Dashboard::with_clock(DashboardConfig::default(), clock.clone()).unwrap();
    let mut scroller = widget(2);
    dashboard.replace_collection(sample(), &mut scroller);

    assert!(matches!(
        dashboard.select_year(2019, &mut scroller),
        Err(DashboardError::UnknownYear(2019))
    ));
    assert_eq!(dashboard.year_view().selected_year, Some(2024));

    dashboard.select_year(2023, &mut scroller).unwrap();
    // 第2项 offset 80，高40，视口高120 -> 80 - 60 + 20 = 40
    assert_eq!(scroller.scrolled_to, Some(40.0));
    assert_eq!(dashboard.charts().weekly.labels, vec!["W28"]);

    scroller.viewport.scroll_top = 0.0;
    let first = dashboard.on_scroll();
    clock.advance(50);
    // 最后一次滚动停在第2项居中的位置
    scroller.viewport.scroll_top = 40.0;
    let last = dashboard.on_scroll();
    clock.advance(150);
    assert!(!dashboard.on_timer(first, &mut scroller));
    assert!(dashboard.on_timer(last, &mut scroller));

    let view = dashboard.year_view();
    assert_eq!(view.available_years, vec![2024, 2023]);
    assert_eq!(view.focused_year, Some(2023));
    assert_eq!(view.emphasis.iter().filter(|e| e.focused).count(), 1);
}

#[test]
fn test_load_centers_and_focuses_selected_year() {
    let mut dashboard = dashboard();
    let mut scroller = widget(2);
    scroller.viewport.scroll_top = 70.0;

    let ticket = dashboard.begin_fetch("tourist").unwrap();
    dashboard.complete_fetch(ticket, Ok(sample()), &mut scroller);

    let view = dashboard.year_view();
    assert_eq!(view.selected_year, Some(2024));
    assert_eq!(view.focused_year, view.selected_year);
    assert_eq!(view.emphasis.len(), 2);
    assert_eq!(scroller.scrolled_to, Some(0.0));
    assert!(scroller.emphasis[0].focused);
}

#[test]
fn test_malformed_response_shows_generic_message() {
    let mut dashboard = loaded(sample());
    let ticket = dashboard.begin_fetch("tourist").unwrap();

    let result = FetchResponse::from_json("<html>502 Bad Gateway</html>")
        .and_then(FetchResponse::into_result)
        .map_err(CommonError::into_user_facing);
    let outcome = dashboard.complete_fetch(ticket, result, &mut GeometrySnapshot::default());

    assert_eq!(
        outcome,
        FetchOutcome::Failed {
            message: GENERIC_FETCH_ERROR.to_string()
        }
    );
    assert_eq!(dashboard.error(), Some(GENERIC_FETCH_ERROR));
    assert!(dashboard.records().is_empty());
}
