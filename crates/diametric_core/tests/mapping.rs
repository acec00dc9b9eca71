//! End-to-end mapping tests over a two-attribute entity type.

use diametric_core::{
    from_row, AttributeOptions, Config, EntityInstance, EntityRef, EntityTypeDescriptor, Mapper,
    QueryBuilder, SchemaCompiler, SemanticType, TempIdAllocator, TransactionBuilder,
};
use diametric_edn::{from_edn, Keyword, Symbol, ToEdn, Value};
use std::sync::Arc;

fn person() -> Arc<EntityTypeDescriptor> {
    Arc::new(
        EntityTypeDescriptor::builder("Person")
            .prefix("p")
            .attribute("name", SemanticType::String, AttributeOptions::new())
            .attribute("age", SemanticType::Long, AttributeOptions::new())
            .build()
            .unwrap(),
    )
}

#[test]
fn schema_has_one_record_per_attribute() {
    let records = SchemaCompiler::default().compile(&person()).unwrap();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].ident(), Some(&Keyword::namespaced("p", "name")));
    assert_eq!(records[0].value_type(), Some(&Keyword::namespaced("db.type", "string")));
    assert_eq!(records[1].ident(), Some(&Keyword::namespaced("p", "age")));
    assert_eq!(records[1].value_type(), Some(&Keyword::namespaced("db.type", "long")));
}

#[test]
fn temp_refs_strictly_decrease() {
    let allocator = TempIdAllocator::default();
    let refs: Vec<i64> = (0..100).map(|_| allocator.next_ref()).collect();
    assert!(refs.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn unpersisted_instance_keeps_its_temp_id() {
    let builder = TransactionBuilder::new(Arc::new(TempIdAllocator::default()));
    let ann = EntityInstance::with_values(person(), [("name", "Ann")]).unwrap();

    let first = builder.build(&ann).unwrap();
    let second = builder.build(&ann).unwrap();
    assert_eq!(first.entity().unwrap().id(), second.entity().unwrap().id());
    assert!(matches!(first.entity().unwrap().id(), EntityRef::Temp(_)));
}

#[test]
fn persisted_instance_uses_its_id() {
    let allocator = Arc::new(TempIdAllocator::default());
    let builder = TransactionBuilder::new(Arc::clone(&allocator));
    let mut ann = EntityInstance::new(person());
    ann.set_persisted_id(42).unwrap();

    let tx = builder.build(&ann).unwrap();
    assert_eq!(tx.entity().unwrap().id(), &EntityRef::Persisted(42));
    assert_eq!(allocator.current(), -1000);
}

#[test]
fn unfiltered_query_shape() {
    let request = QueryBuilder::default()
        .build(&person(), Vec::<(String, Value)>::new())
        .unwrap();

    assert_eq!(
        request.query.find(),
        &[Symbol::var("e"), Symbol::var("name"), Symbol::var("age")]
    );
    assert_eq!(request.query.inputs(), &[Symbol::source()]);
    assert_eq!(
        request.query.to_edn(),
        from_edn("[:find ?e ?name ?age :in $ :where [?e :p/name ?name] [?e :p/age ?age]]").unwrap()
    );
    assert!(request.args.is_empty());
}

#[test]
fn filter_becomes_input_and_argument() {
    let request = QueryBuilder::default()
        .build(&person(), [("email", "x@y.com")])
        .unwrap();

    assert!(request.query.inputs().contains(&Symbol::var("email")));
    assert_eq!(request.args, vec![Value::from("x@y.com")]);
}

#[test]
fn row_round_trips_into_transaction() {
    let builder = TransactionBuilder::new(Arc::new(TempIdAllocator::default()));
    let row = [Value::Integer(7), Value::from("Ann"), Value::Integer(30)];
    let ann = from_row(&person(), &row).unwrap();

    let tx = builder.build(&ann).unwrap();
    assert_eq!(
        tx.to_edn(),
        from_edn(r#"[{:db/id 7 :p/name "Ann" :p/age 30}]"#).unwrap()
    );
}

#[test]
fn host_writes_back_store_id() {
    let mut mapper = Mapper::new(Config::new().default_partition("db.part/user"));
    let person = mapper
        .register(
            mapper
                .define("Person")
                .attribute("name", SemanticType::String, AttributeOptions::new()),
        )
        .unwrap();

    let mut ann = mapper.instance(&person);
    ann.set("name", "Ann").unwrap();
    let before = mapper.transaction(&ann).unwrap();
    assert_eq!(
        before.to_edn_string().unwrap(),
        "[{:db/id #db/id [:db.part/user -1001], :person/name \"Ann\"}]"
    );

    // The store resolved -1001 to 17592186045418.
    ann.set_persisted_id(17_592_186_045_418).unwrap();
    let after = mapper.transaction(&ann).unwrap();
    assert_eq!(
        after.to_edn_string().unwrap(),
        "[{:db/id 17592186045418, :person/name \"Ann\"}]"
    );
}
