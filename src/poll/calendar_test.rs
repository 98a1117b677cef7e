use super::*;
use time::macros::date;

// =============================================================================
// month arithmetic
// =============================================================================

#[test]
fn days_in_month_handles_leap_years() {
    assert_eq!(days_in_month(2024, Month::February), 29);
    assert_eq!(days_in_month(2025, Month::February), 28);
    assert_eq!(days_in_month(1900, Month::February), 28);
    assert_eq!(days_in_month(2000, Month::February), 29);
    assert_eq!(days_in_month(2025, Month::July), 31);
    assert_eq!(days_in_month(2025, Month::June), 30);
}

#[test]
fn first_weekday_is_sunday_based() {
    // 2025-06-01 was a Sunday, 2025-07-01 a Tuesday.
    assert_eq!(first_weekday(2025, Month::June), Some(0));
    assert_eq!(first_weekday(2025, Month::July), Some(2));
}

#[test]
fn cursor_wraps_year_boundaries() {
    let dec = MonthCursor { year: 2025, month: Month::December };
    assert_eq!(dec.next(), MonthCursor { year: 2026, month: Month::January });
    assert_eq!(dec.next().prev(), dec);
    let jan = MonthCursor { year: 2025, month: Month::January };
    assert_eq!(jan.prev(), MonthCursor { year: 2024, month: Month::December });
}

#[test]
fn month_view_flags_past_today_and_selected() {
    let today = date!(2025 - 07 - 10);
    let selected = BTreeSet::from([date!(2025 - 07 - 12)]);
    let view = month_view(MonthCursor::containing(today), today, &selected).unwrap();
    assert_eq!(view.month, 7);
    assert_eq!(view.leading_blanks, 2);
    assert_eq!(view.days.len(), 31);
    assert!(view.days[8].is_past);
    assert!(view.days[9].is_today);
    assert!(!view.days[9].is_past);
    assert!(view.days[11].is_selected);
    assert_eq!(view.days.iter().filter(|d| d.is_selected).count(), 1);
}

// =============================================================================
// DateSelection
// =============================================================================

#[test]
fn toggle_rejects_past_dates() {
    let mut sel = DateSelection::new(date!(2025 - 07 - 10));
    assert!(!sel.toggle(date!(2025 - 07 - 09)));
    assert!(sel.selected().is_empty());
    assert!(sel.toggle(date!(2025 - 07 - 10)));
    assert!(sel.toggle(date!(2025 - 07 - 10)));
    assert!(sel.selected().is_empty());
}

#[test]
fn drag_selects_span_matching_anchor_state() {
    let mut sel = DateSelection::new(date!(2025 - 07 - 10));
    assert!(sel.press(date!(2025 - 07 - 15)));
    sel.drag(date!(2025 - 07 - 12));
    sel.release();
    assert_eq!(
        sel.clone().into_dates(),
        vec![date!(2025 - 07 - 12), date!(2025 - 07 - 13), date!(2025 - 07 - 14), date!(2025 - 07 - 15)]
    );

    // Pressing a selected day deselects, and dragging clears the span.
    assert!(sel.press(date!(2025 - 07 - 13)));
    sel.drag(date!(2025 - 07 - 14));
    sel.release();
    assert_eq!(sel.into_dates(), vec![date!(2025 - 07 - 12), date!(2025 - 07 - 15)]);
}

#[test]
fn drag_skips_past_days_and_ignores_past_pointer() {
    let mut sel = DateSelection::new(date!(2025 - 07 - 10));
    assert!(!sel.press(date!(2025 - 07 - 08)));
    sel.drag(date!(2025 - 07 - 12));
    assert!(sel.selected().is_empty(), "no anchor after rejected press");

    assert!(sel.press(date!(2025 - 07 - 11)));
    sel.drag(date!(2025 - 07 - 05));
    assert_eq!(sel.selected().len(), 1);
}

#[test]
fn select_range_crosses_month_and_skips_past() {
    let mut sel = DateSelection::new(date!(2025 - 07 - 30));
    sel.select_range(date!(2025 - 08 - 02), date!(2025 - 07 - 28));
    assert_eq!(
        sel.into_dates(),
        vec![date!(2025 - 07 - 30), date!(2025 - 07 - 31), date!(2025 - 08 - 01), date!(2025 - 08 - 02)]
    );
}

#[test]
fn select_range_stops_at_cap_for_huge_span() {
    let today = date!(2025 - 07 - 10);
    let mut sel = DateSelection::new(today);
    assert!(!sel.select_range(today, Date::MAX));
    assert_eq!(sel.selected().len(), usize::from(MAX_GRID_DAYS));
    assert_eq!(sel.selected().first(), Some(&today));
    assert!(sel.is_full());
}

#[test]
fn select_range_from_distant_past_walks_from_today() {
    let today = date!(2025 - 07 - 10);
    let mut sel = DateSelection::new(today);
    assert!(sel.select_range(Date::MIN, date!(2025 - 07 - 12)));
    assert_eq!(sel.into_dates(), vec![today, date!(2025 - 07 - 11), date!(2025 - 07 - 12)]);
}

#[test]
fn toggle_refuses_past_cap_but_still_deselects() {
    let today = date!(2025 - 07 - 10);
    let mut sel = DateSelection::new(today);
    assert!(sel.select_range(today, date!(2025 - 07 - 23)));
    assert!(sel.is_full());
    assert!(!sel.toggle(date!(2025 - 07 - 24)));
    assert!(sel.toggle(today));
    assert_eq!(sel.selected().len(), 13);
}

#[test]
fn deselect_drag_over_huge_span_clears_only_selected() {
    let today = date!(2025 - 07 - 10);
    let mut sel = DateSelection::new(today);
    sel.select_range(date!(2025 - 07 - 11), date!(2025 - 07 - 13));
    assert!(sel.press(date!(2025 - 07 - 11)));
    assert!(sel.drag(Date::MAX));
    sel.release();
    assert!(sel.selected().is_empty());
}

#[test]
fn calendar_page_marks_selection_and_neighbours() {
    let today = date!(2025 - 12 - 20);
    let mut sel = DateSelection::new(today);
    sel.select_range(date!(2025 - 12 - 30), date!(2026 - 01 - 02));
    let page = calendar_page(MonthCursor::containing(today), &sel).unwrap();
    assert_eq!(page.view.month, 12);
    assert_eq!(page.selected.len(), 4);
    assert_eq!(page.view.days.iter().filter(|d| d.is_selected).count(), 2);
    assert!(!page.full);
    assert_eq!(page.prev, MonthRef { year: 2025, month: 11 });
    assert_eq!(page.next, MonthRef { year: 2026, month: 1 });
}
