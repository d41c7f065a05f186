use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use stoneworks_api::entities::order::WorkTypes;
use stoneworks_api::entities::{order, order_detail, order_stage, order_stage_assignment};
use stoneworks_api::services::scheduling::{
    normalize, visible_assignments, AssignmentFilters, CalendarRow, DetailRow, DetailWithStages,
    OrderWithDetails, StageRow,
};

const STAGES_PER_ORDER: i64 = 6;
const EMPLOYEES: [&str; 5] = [
    "John Doe",
    "Jane Smith",
    "Carlos Rodriguez",
    "Fatima Ali",
    "Omar Khaled",
];
const STATUSES: [&str; 3] = ["not_started", "in_progress", "completed"];

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Days::new((n % 28) as u64)
}

fn assignment(id: i64, stage_id: i64) -> order_stage_assignment::Model {
    order_stage_assignment::Model {
        id,
        order_stage_id: Some(stage_id),
        employee_name: EMPLOYEES[(id % EMPLOYEES.len() as i64) as usize].to_string(),
        work_date: day(id),
        is_done: false,
        note: None,
        employee_rate: None,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap(),
    }
}

fn stage(id: i64, detail_id: i64) -> order_stage::Model {
    order_stage::Model {
        id,
        order_detail_id: detail_id,
        stage_name: "cutting".to_string(),
        status: STATUSES[(id % STATUSES.len() as i64) as usize].to_string(),
        planned_start_date: None,
        planned_finish_date: None,
        actual_start_date: None,
        actual_finish_date: None,
        notes: None,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap(),
        updated_at: None,
    }
}

fn detail(detail_id: i64, order_id: i64) -> order_detail::Model {
    order_detail::Model {
        detail_id,
        order_id,
        assigned_to: Some("workshop".to_string()),
        updated_date: None,
        due_date: None,
        price: dec!(12000),
        total_cost: dec!(7000),
        notes: None,
        img_url: None,
        process_stage: Some("cutting".to_string()),
        updated_at: None,
    }
}

fn order_row(id: i64) -> order::Model {
    order::Model {
        id,
        code: format!("K-{id}"),
        customer_id: id,
        customer_name: format!("Customer {id}"),
        company: None,
        address: Some("12 Quarry Rd".to_string()),
        order_status: "working".to_string(),
        order_price: dec!(12000),
        work_types: WorkTypes::new(vec!["kitchen".to_string()]),
        created_by: Some("system".to_string()),
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap(),
        updated_at: None,
    }
}

/// `size` assignments spread over `size / 10` orders, six stages each, so
/// normalization has real deduplication work to do.
fn calendar_rows(size: i64) -> Vec<CalendarRow> {
    let order_count = (size / 10).max(1);
    (0..size)
        .map(|i| {
            let stage_id = i % (order_count * STAGES_PER_ORDER);
            let order_id = stage_id / STAGES_PER_ORDER;
            CalendarRow {
                assignment: assignment(i, stage_id),
                stage: Some(StageRow {
                    stage: stage(stage_id, order_id),
                    detail: Some(DetailRow {
                        detail: detail(order_id, order_id),
                        order: Some(order_row(order_id)),
                    }),
                }),
            }
        })
        .collect()
}

fn filter_context(
    order_count: i64,
) -> (
    Vec<order_stage_assignment::Model>,
    Vec<order_stage::Model>,
    Vec<OrderWithDetails>,
) {
    let assignments: Vec<_> = (0..order_count * STAGES_PER_ORDER)
        .map(|i| assignment(i, i))
        .collect();
    let stages: Vec<_> = (0..order_count * STAGES_PER_ORDER)
        .map(|i| stage(i, i / STAGES_PER_ORDER))
        .collect();
    let orders: Vec<_> = (0..order_count)
        .map(|order_id| OrderWithDetails {
            order: order_row(order_id),
            details: vec![DetailWithStages {
                detail: detail(order_id, order_id),
                stages: stages
                    .iter()
                    .filter(|s| s.order_detail_id == order_id)
                    .cloned()
                    .collect(),
            }],
        })
        .collect();
    (assignments, stages, orders)
}

fn normalize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("calendar_normalize");

    for size in [50, 200, 1000].iter() {
        let rows = calendar_rows(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &rows, |b, rows| {
            b.iter(|| {
                let data = normalize(black_box(rows.clone()));
                black_box(data)
            });
        });
    }

    group.finish();
}

fn filter_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("calendar_filters");
    let (assignments, stages, orders) = filter_context(50);

    group.bench_function("by_order", |b| {
        let filters = AssignmentFilters {
            order_id: Some(25),
            employee_names: Vec::new(),
            statuses: Vec::new(),
        };
        b.iter(|| {
            let kept = visible_assignments(
                black_box(&assignments),
                black_box(&stages),
                black_box(&orders),
                &filters,
            );
            black_box(kept)
        });
    });

    group.bench_function("by_employee", |b| {
        let filters = AssignmentFilters {
            order_id: None,
            employee_names: vec!["Jane Smith".to_string()],
            statuses: Vec::new(),
        };
        b.iter(|| {
            let kept = visible_assignments(
                black_box(&assignments),
                black_box(&stages),
                black_box(&orders),
                &filters,
            );
            black_box(kept)
        });
    });

    group.bench_function("conjunction", |b| {
        let filters = AssignmentFilters {
            order_id: Some(10),
            employee_names: vec!["John Doe".to_string(), "Omar Khaled".to_string()],
            statuses: vec!["in_progress".to_string()],
        };
        b.iter(|| {
            let kept = visible_assignments(
                black_box(&assignments),
                black_box(&stages),
                black_box(&orders),
                &filters,
            );
            black_box(kept)
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(100);
    targets =
        normalize_benchmark,
        filter_benchmark,
}

criterion_main!(benches);
