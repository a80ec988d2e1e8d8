//! Benchmarks for the authorization hot path.
//!
//! Run with: `cargo bench -p fleetgate-auth`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use fleetgate_auth::{Action, Precondition, Principal, Role, Target, authorize, authorize_with, explain};
use fleetgate_core::{Resource, ResourceId, ResourceKind, TenantId};

fn bench_authorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("authorize");

    let own = Resource::new(ResourceId::from("v1"), ResourceKind::Vehicle, Some(TenantId::from("co-1")));
    let foreign = Resource::new(ResourceId::from("v2"), ResourceKind::Vehicle, Some(TenantId::from("co-2")));

    for role in Role::ALL {
        let principal = if role.is_admin() {
            Principal::admin("root")
        } else {
            Principal::scoped("u-1", role, "co-1")
        };

        group.bench_with_input(BenchmarkId::new("own_tenant_update", role), &principal, |b, p| {
            b.iter(|| authorize(black_box(Some(p)), Action::Update, Target::Resource(black_box(&own))))
        });

        group.bench_with_input(BenchmarkId::new("foreign_tenant_read", role), &principal, |b, p| {
            b.iter(|| authorize(black_box(Some(p)), Action::Read, Target::Resource(black_box(&foreign))))
        });
    }

    group.finish();
}

fn bench_preconditions(c: &mut Criterion) {
    let manager = Principal::scoped("u-1", Role::Manager, "co-3");
    let scope = Resource::new(ResourceId::from("new"), ResourceKind::Vehicle, Some(TenantId::from("co-3")));
    let pre = [Precondition::TenantActive {
        tenant_id: TenantId::from("co-3"),
        active: true,
    }];

    c.bench_function("authorize_with/create_under_active_tenant", |b| {
        b.iter(|| authorize_with(Some(&manager), Action::Create, Target::Resource(&scope), black_box(&pre)))
    });

    c.bench_function("explain/create_under_active_tenant", |b| {
        b.iter(|| explain(Some(&manager), Action::Create, Target::Resource(&scope), black_box(&pre)))
    });
}

criterion_group!(benches, bench_authorize, bench_preconditions);
criterion_main!(benches);
