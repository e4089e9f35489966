//! Tests for `#[derive(quarry_macros::Queryable)]`.

use quarry::{Filter, InMemoryQueryEngine, Number, Operator, OrderBy, Queryable, Timestamp, Value};

#[derive(quarry_macros::Queryable)]
struct Address {
    #[query(String)]
    city: String,
}

#[derive(quarry_macros::Queryable)]
struct Contact {
    #[query(String)]
    email: String,
    #[query(Entity)]
    address: Option<Box<Address>>,
}

#[derive(quarry_macros::Queryable)]
struct Person {
    #[query(Number)]
    id: u64,
    #[query(String, rename = "firstName")]
    first_name: String,
    #[query(String)]
    nickname: Option<String>,
    #[query(Number)]
    score: f32,
    #[query(Bool)]
    admin: bool,
    #[query(Timestamp)]
    joined: i64,
    #[query(Entity)]
    contact: Contact,
    #[query(skip)]
    #[allow(dead_code)]
    password: String,
    #[allow(dead_code)]
    unexposed: u8,
}

fn person(id: u64, first: &str, nickname: Option<&str>, city: Option<&str>) -> Person {
    Person {
        id,
        first_name: first.to_string(),
        nickname: nickname.map(str::to_string),
        score: id as f32 * 1.5,
        admin: id == 1,
        joined: 1_000 * id as i64,
        contact: Contact {
            email: format!("{}@example.com", first.to_lowercase()),
            address: city.map(|c| {
                Box::new(Address {
                    city: c.to_string(),
                })
            }),
        },
        password: "hunter2".to_string(),
        unexposed: 0,
    }
}

#[test]
fn generates_field_constants() {
    assert_eq!(Person::ID, "id");
    assert_eq!(Person::FIRST_NAME, "firstName");
    assert_eq!(Person::CONTACT, "contact");
    assert_eq!(Contact::EMAIL, "email");
}

#[test]
fn exposes_annotated_fields() {
    let p = person(1, "Jack", Some("JJ"), None);
    assert_eq!(p.resolve("id").unwrap(), Value::Number(Number::U64(1)));
    assert_eq!(p.resolve("firstName").unwrap(), Value::String("Jack"));
    assert_eq!(p.resolve("nickname").unwrap(), Value::String("JJ"));
    assert_eq!(p.resolve("score").unwrap(), Value::Number(Number::F64(1.5)));
    assert_eq!(p.resolve("admin").unwrap(), Value::Bool(true));
    assert_eq!(p.resolve("joined").unwrap(), Value::Timestamp(Timestamp(1_000)));
}

#[test]
fn none_is_null() {
    let p = person(2, "Jill", None, None);
    assert!(p.resolve("nickname").unwrap().is_null());
    assert!(p.resolve("contact.address.city").unwrap().is_null());
}

#[test]
fn skipped_and_unannotated_fields_are_unknown() {
    let p = person(1, "Jack", None, None);
    assert!(p.field("password").is_none());
    assert!(p.field("unexposed").is_none());
    assert!(p.field("first_name").is_none());
    assert!(p.resolve("password").is_err());
}

#[test]
fn traverses_nested_entities() {
    let p = person(1, "Jack", None, Some("Vienna"));
    assert_eq!(
        p.resolve("contact.email").unwrap(),
        Value::String("jack@example.com")
    );
    assert_eq!(
        p.resolve("contact.address.city").unwrap(),
        Value::String("Vienna")
    );
}

#[test]
fn derived_entities_work_with_the_engine() {
    let people = vec![
        person(1, "Jack", None, Some("Vienna")),
        person(2, "Jill", None, None),
        person(3, "Joe", None, Some("Graz")),
    ];
    let filter = Filter::new().add(
        format!("{}.{}", Person::CONTACT, Contact::EMAIL),
        Operator::Like,
        "j%",
    );
    let query = quarry::Query::new()
        .filter(filter)
        .order_by(OrderBy::desc(Person::FIRST_NAME));

    let found = InMemoryQueryEngine::new().query(&people, &query).unwrap();
    let names: Vec<&str> = found.iter().map(|p| p.first_name.as_str()).collect();
    assert_eq!(names, vec!["Joe", "Jill", "Jack"]);

    let in_vienna = Filter::new().add("contact.address.city", Operator::Eq, "Vienna");
    assert_eq!(InMemoryQueryEngine::new().count(&people, &in_vienna).unwrap(), 1);
}
