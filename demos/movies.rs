use dynamo_items::{Connection, ItemStore, KeySchema, Movie, StoreError, Throughput};
use std::error::Error;

const TABLE: &str = "Movies";

fn main() -> Result<(), Box<dyn Error>> {
    // Runs against DynamoDB Local, where a new table is usable as soon as CreateTable returns:
    //
    //   docker run -p 8000:8000 amazon/dynamodb-local
    //   AWS_ACCESS_KEY_ID=foo AWS_SECRET_ACCESS_KEY=foo \
    //   AWS_ENDPOINT_URL=http://localhost:8000 RUST_LOG=info \
    //     cargo run --example movies --features reqwest
    //
    // Real DynamoDB answers CreateTable while the table is still CREATING and rejects puts
    // until it is ACTIVE, so create the table there beforehand, e.g. with
    // `aws dynamodb create-table` followed by `aws dynamodb wait table-exists`.
    env_logger::init();
    let store = ItemStore::new(Connection::from_env()?);

    if let Err(err) = store.ensure_table(TABLE, &KeySchema::of::<Movie>(), Throughput::default()) {
        eprintln!("Got error creating table {}: {}", TABLE, err);
    }

    store.put(TABLE, &Movie::new(2017, "Hello", "Action", 3.0))?;
    store.put(TABLE, &Movie::new(2018, "Hello World", "Action", 3.0))?;
    println!("{:#?}", store.get::<Movie>(TABLE, 2017, "Hello")?);

    store.update_field::<Movie>(TABLE, 2018, "Hello World", "Rating", 0.5)?;
    println!("{:#?}", store.get::<Movie>(TABLE, 2018, "Hello World")?);

    store.delete::<Movie>(TABLE, 2017, "Hello")?;
    println!("{:#?}", store.get::<Movie>(TABLE, 2017, "Hello")?);

    match store.update_field::<Movie>(TABLE, 2015, "The Big New Movie", "Rating", 0.5) {
        Err(StoreError::NoSuchItem { partition, sort }) => {
            println!("'{}' ({}) was never added, nothing to update", sort, partition)
        }
        other => other?,
    }

    Ok(())
}
