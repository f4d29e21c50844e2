use std::collections::BTreeSet;

use memlane_lib::query::{QueryCodec, QueryParams};
use memlane_lib::state::{
    FilterKey, FilterValue, Filters, Pagination, SortEntry, TableViewState, UrlState,
};
use proptest::prelude::*;

fn pagination() -> impl Strategy<Value = Pagination> {
    (
        prop_oneof![0..5usize, any::<usize>()],
        prop_oneof![1..=50usize, 1..=usize::MAX],
    )
        .prop_map(|(page_index, page_size)| Pagination::new(page_index, page_size))
}

fn options() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[A-Za-z &=+:%]{1,8}", 0..4)
}

fn sort() -> impl Strategy<Value = Option<SortEntry>> {
    prop::option::of(("[a-zA-Z:]{1,10}", any::<bool>())).prop_map(|sort| {
        sort.map(|(column, descending)| {
            if descending {
                SortEntry::desc(column)
            } else {
                SortEntry::asc(column)
            }
        })
    })
}

fn url_state() -> impl Strategy<Value = UrlState> {
    (
        pagination(),
        "[a-z &=+:%?#]{0,12}",
        options(),
        options(),
        options(),
        options(),
        sort(),
    )
        .prop_map(|(pagination, title, status, priority, kind, reviewer, sort)| {
            let filters = Filters::new()
                .with(FilterKey::Title, FilterValue::text(title))
                .with(FilterKey::Status, FilterValue::options(status))
                .with(FilterKey::Priority, FilterValue::options(priority))
                .with(FilterKey::Type, FilterValue::options(kind))
                .with(FilterKey::Reviewer, FilterValue::options(reviewer));
            UrlState {
                pagination,
                filters,
                sort,
            }
        })
}

/// Query strings mixing table keys, a foreign key and junk values.
fn raw_query() -> impl Strategy<Value = QueryParams> {
    let key = prop_oneof![
        Just("page"),
        Just("per_page"),
        Just("sort"),
        Just("title"),
        Just("status"),
        Just("priority"),
        Just("type"),
        Just("reviewer"),
        Just("tab"),
    ];
    prop::collection::vec((key, "[a-z0-9:+ -]{0,6}"), 0..8)
        .prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_encode_decode_round_trips(state in url_state()) {
        let codec = QueryCodec::default();
        let params = codec.encode_url_state(&state);

        prop_assert_eq!(codec.decode(&params), state.clone());
        prop_assert_eq!(codec.decode_str(&params.to_query_string()), state);
    }

    #[test]
    fn prop_encode_is_idempotent(state in url_state()) {
        let codec = QueryCodec::new(25);
        let once = codec.encode_url_state(&state).to_query_string();
        let twice = codec.encode_url_state(&codec.decode_str(&once)).to_query_string();

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_merge_keeps_foreign_params(state in url_state(), tab in "[a-z0-9 &=]{0,8}") {
        let codec = QueryCodec::default();
        let mut current = QueryParams::new();
        current.append("tab", tab.as_str());
        current.append("page", "7");

        let full = TableViewState {
            pagination: state.pagination,
            filters: state.filters.clone(),
            sort: state.sort.clone(),
            ..TableViewState::default()
        };
        let merged = QueryParams::parse(&codec.merge(&full, &current).to_query_string());

        prop_assert_eq!(merged.get("tab"), Some(tab.as_str()));
        prop_assert_eq!(codec.decode(&merged), state);
    }

    #[test]
    fn prop_decode_is_stable(params in raw_query()) {
        let codec = QueryCodec::default();
        let decoded = codec.decode(&params);
        let reencoded = codec.encode_url_state(&decoded);

        prop_assert_eq!(codec.decode(&reencoded), decoded);
    }
}
