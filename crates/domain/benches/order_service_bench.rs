use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    CompleteOrder, CorrelationId, DeleteOrder, DomainEvent, OrderEvent, OrderId, OrderService,
    RequestContext, SubmitOrder, UpdateOrder,
};
use messaging::InMemoryEventPublisher;
use order_store::InMemoryOrderStore;

fn create_service() -> OrderService<InMemoryOrderStore, InMemoryEventPublisher> {
    OrderService::new(InMemoryOrderStore::new(), InMemoryEventPublisher::new())
}

fn bench_submit_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/submit_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                let service = create_service();
                let cmd = SubmitOrder::new(OrderId::generate(), "C1", "E1", 2);
                service
                    .submit_order(&RequestContext::new(), cmd)
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_update_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = create_service();
    let ctx = RequestContext::new();
    rt.block_on(async {
        service
            .submit_order(&ctx, SubmitOrder::new("O1", "C1", "E1", 2))
            .await
            .unwrap()
    });

    c.bench_function("domain/update_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                service
                    .update_order(&ctx, UpdateOrder::new("O1").with_tickets_count(3))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_full_lifecycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/full_submit_update_complete_delete", |b| {
        b.iter(|| {
            rt.block_on(async {
                let service = create_service();
                let ctx = RequestContext::new();
                let order_id = OrderId::generate();

                service
                    .submit_order(&ctx, SubmitOrder::new(order_id.clone(), "C1", "E1", 2))
                    .await
                    .unwrap();
                service
                    .update_order(&ctx, UpdateOrder::new(order_id.clone()).with_tickets_count(3))
                    .await
                    .unwrap();
                service
                    .complete_order(&ctx, CompleteOrder::new(order_id.clone()))
                    .await
                    .unwrap();
                service
                    .delete_order(&ctx, DeleteOrder::new(order_id))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_event_to_message(c: &mut Criterion) {
    let correlation_id = CorrelationId::new();
    let event = OrderEvent::cancelled(correlation_id, OrderId::new("O1"), "Changed my mind");

    c.bench_function("domain/event_to_message", |b| {
        b.iter(|| {
            event.to_message(correlation_id).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_submit_order,
    bench_update_order,
    bench_full_lifecycle,
    bench_event_to_message
);
criterion_main!(benches);
