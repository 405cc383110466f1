use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dynamo_items::{Connection, Const, Credentials, ItemStore, Movie, Region, Request, StoreError};

fn put_item(
    store: &ItemStore,
    movie: &Movie,
) -> Result<Request, StoreError> {
    store.put_item_req("Movies", movie)
}

fn criterion_benchmark(c: &mut Criterion) {
    let store = ItemStore::new(Connection::new(
        Credentials::new("test", "test"),
        Region::UsEast1,
        Some("http://localhost:8000".to_string()),
        Const(200, "{}".into()),
    ));
    let movie = Movie::new(2015, "The Big New Movie", "Nothing happens at all.", 0.0);
    c.bench_function("put_item_req", |b| b.iter(|| put_item(black_box(&store), black_box(&movie))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
