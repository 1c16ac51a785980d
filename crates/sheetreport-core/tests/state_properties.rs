use chrono::NaiveDate;
use proptest::prelude::*;
use proptest::sample::Index;
use rust_decimal::Decimal;
use sheetreport_core::{
    sample_records, AiReport, AppState, Category, Completion, GenerationStatus, GenerationTicket,
    NewSalesRecord, ReportError, SaleStatus, SalesRecord,
};
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Add(u32),
    Remove(Index),
    RemoveUnknown,
    Begin,
    Finish(bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..50).prop_map(Op::Add),
        any::<Index>().prop_map(Op::Remove),
        Just(Op::RemoveUnknown),
        Just(Op::Begin),
        any::<bool>().prop_map(Op::Finish),
    ]
}

fn draft(units: u32) -> NewSalesRecord {
    NewSalesRecord {
        date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
        product: format!("Bundle {}", units),
        category: Category::Hardware,
        units,
        revenue: Decimal::new(i64::from(units) * 1999, 2),
        status: SaleStatus::Pending,
    }
}

fn report() -> AiReport {
    AiReport {
        summary: "Steady month.".to_string(),
        key_insights: vec!["Hardware is growing".to_string()],
        recommendation: "Restock kits.".to_string(),
        generated_at: NaiveDate::from_ymd_opt(2024, 5, 21).unwrap(),
    }
}

proptest! {
    #[test]
    fn prop_mutations_keep_order_unique_ids_and_reset_report(ops in prop::collection::vec(op(), 0..40)) {
        let mut state = AppState::new(sample_records());
        let mut model: Vec<SalesRecord> = sample_records();
        let mut pending: Option<(GenerationTicket, u64)> = None;

        for op in ops {
            let generation_before = state.generation();
            let mutated = match op {
                Op::Add(units) => {
                    let added = state.add_record(draft(units)).clone();
                    model.push(added);
                    true
                }
                Op::Remove(index) => {
                    if model.is_empty() {
                        prop_assert!(state.remove_record("missing").is_none());
                    } else {
                        let expected = model.remove(index.index(model.len()));
                        let removed = state.remove_record(&expected.id);
                        prop_assert_eq!(removed, Some(expected));
                    }
                    true
                }
                Op::RemoveUnknown => {
                    prop_assert!(state.remove_record("not-a-record-id").is_none());
                    true
                }
                Op::Begin => {
                    if let Ok(ticket) = state.begin_generation() {
                        pending = Some((ticket, state.generation()));
                    }
                    false
                }
                Op::Finish(succeeded) => {
                    if let Some((ticket, issued_at)) = pending.take() {
                        let result = if succeeded { Ok(report()) } else { Err(ReportError::EmptyResponse) };
                        let completion = state.complete_generation(ticket, result);
                        if issued_at == state.generation() {
                            prop_assert!(matches!(completion, Completion::Applied(_)));
                        } else {
                            prop_assert_eq!(completion, Completion::Stale);
                        }
                    }
                    false
                }
            };

            prop_assert_eq!(state.records(), model.as_slice());

            let ids: HashSet<&str> = state.records().iter().map(|r| r.id.as_str()).collect();
            prop_assert_eq!(ids.len(), state.records().len());

            if mutated {
                prop_assert!(state.report().is_none());
                prop_assert!(state.last_error().is_none());
                prop_assert_eq!(state.status(), GenerationStatus::Idle);
                prop_assert_eq!(state.generation(), generation_before + 1);
            } else {
                prop_assert_eq!(state.generation(), generation_before);
            }
        }
    }
}
