use semstore::rdf::{
    GraphMaterializer, JsonLdSerializerWrapper, MaterializeOptions, NodeValue, PrefixMap,
    QuadStore, RdfFormat,
};
use serde_json::json;

const PEOPLE: &str = r#"
    @prefix ex: <http://example.org/> .
    @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

    ex:alice a ex:Person , ex:Agent ;
        ex:name "Alice" ;
        ex:age "30"^^xsd:integer ;
        ex:knows ex:bob ;
        ex:memberOf ex:acme .

    ex:bob a ex:Person ;
        ex:name "Bob"@en ;
        ex:knows ex:alice .
"#;

fn prefixes() -> PrefixMap {
    PrefixMap::new()
        .with_prefix("ex", "http://example.org/")
        .with_prefix("xsd", "http://www.w3.org/2001/XMLSchema#")
}

fn people() -> QuadStore {
    let mut store = QuadStore::new();
    store.import_text(PEOPLE, RdfFormat::Turtle).unwrap();
    store
}

#[test]
fn test_materialize_parsed_turtle() {
    let graph = people().materialize(&prefixes(), MaterializeOptions::default());

    // ex:acme only appears as an object
    assert_eq!(graph.ids().collect::<Vec<_>>(), vec!["ex:alice", "ex:bob"]);
    assert!(!graph.contains("ex:acme"));

    let alice = graph.get("ex:alice").unwrap();
    assert_eq!(alice.id(), Some("ex:alice"));
    assert_eq!(alice.values("@type").len(), 2);
    assert!(!graph.contains("ex:Person"));

    let json = graph.to_json();
    assert_eq!(json["ex:alice"]["@type"], json!([{ "@id": "ex:Person" }, { "@id": "ex:Agent" }]));
    assert_eq!(json["ex:alice"]["ex:name"], "Alice");
    assert_eq!(json["ex:alice"]["ex:age"], json!({ "@value": "30", "@type": "xsd:integer" }));
    assert_eq!(json["ex:alice"]["ex:memberOf"], json!({ "@id": "ex:acme" }));
    assert_eq!(json["ex:bob"]["ex:name"], json!({ "@value": "Bob", "@language": "en" }));
}

#[test]
fn test_meshed_nodes_share_identity() {
    let graph = people().materialize(&prefixes(), MaterializeOptions::default());

    let alice = graph.get("ex:alice").unwrap();
    let bob_ref = match alice.values("ex:knows") {
        [NodeValue::Node(node)] => *node,
        other => panic!("expected embedded node, got {:?}", other),
    };
    assert_eq!(graph.node(bob_ref), graph.get("ex:bob").unwrap());

    // the embedded copy breaks the cycle back to alice
    let json = graph.node_to_json(bob_ref);
    assert_eq!(json["ex:knows"]["@id"], "ex:alice");
    assert_eq!(json["ex:knows"]["ex:knows"], json!({ "@id": "ex:bob" }));
}

#[test]
fn test_unmeshed_and_uncompacted() {
    let options = MaterializeOptions {
        compact: false,
        meshed: false,
        include_blank_ids: false,
    };
    let store = people();
    let graph = GraphMaterializer::new(&prefixes(), options).materialize(store.iter());

    let json = graph.to_json();
    let alice = &json["http://example.org/alice"];
    assert_eq!(alice["http://example.org/knows"], json!({ "@id": "http://example.org/bob" }));
    assert_eq!(
        alice["@type"],
        json!([{ "@id": "http://example.org/Person" }, { "@id": "http://example.org/Agent" }])
    );
}

#[test]
fn test_blank_nodes_embedded() {
    let mut store = QuadStore::new();
    store
        .import_text(
            r#"
            @prefix ex: <http://example.org/> .
            ex:alice ex:address [ ex:city "Paris" ] .
            "#,
            RdfFormat::Turtle,
        )
        .unwrap();

    let json = store.materialize(&prefixes(), MaterializeOptions::default()).to_json();
    assert_eq!(json, json!({
        "ex:alice": { "@id": "ex:alice", "ex:address": { "ex:city": "Paris" } }
    }));

    let with_ids = MaterializeOptions {
        include_blank_ids: true,
        ..Default::default()
    };
    let graph = store.materialize(&prefixes(), with_ids);
    assert_eq!(graph.len(), 2);
    assert!(graph.ids().any(|id| id.starts_with("_:")));
}

#[test]
fn test_document_output() {
    let graph = people().materialize(&prefixes(), MaterializeOptions::default());
    let text = JsonLdSerializerWrapper::serialize_document(&graph, &prefixes()).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(doc["@context"]["xsd"], "http://www.w3.org/2001/XMLSchema#");
    assert_eq!(doc["@graph"].as_array().unwrap().len(), 2);
}
