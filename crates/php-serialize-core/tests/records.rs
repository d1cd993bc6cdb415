use std::collections::BTreeMap;

use php_serialize_core::{
    from_bytes, from_bytes_as, from_bytes_seq, php_enum, php_record, to_bytes, to_bytes_with_config,
    value_to_bytes, ArrayKey, EncodeConfig, ErrorKind, PhpType, PhpValue, TypeDescriptor, Visibility,
};

php_enum! {
    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    pub enum Status {
        #[default]
        Active,
        Suspended,
    }
}

php_record! {
    #[derive(Debug, Default, PartialEq)]
    pub struct Foo {
        pub a: i32,
    }
}

php_record! {
    /// Every member option in one place.
    #[derive(Debug, Default, PartialEq)]
    pub struct Account as "App\\Account" {
        pub id: i32,
        /// Stored under its PHP name.
        #[php(rename = "email_address")]
        pub email: String,
        pub(crate) token: String,
        secret: Option<String>,
        #[php(static)]
        pub instances: i32,
        #[php(skip)]
        pub cache: Vec<u8>,
        pub status: Status,
        pub tags: Vec<String>,
    }
}

php_record! {
    #[derive(Debug, Default, PartialEq)]
    pub struct Profile {
        pub name: String,
        pub nickname: Option<String>,
        pub bio: String,
    }
}

php_record! {
    #[derive(Debug, Default, PartialEq)]
    pub struct Node {
        pub value: i32,
        pub next: Option<Box<Node>>,
    }
}

php_record! {
    #[derive(Debug, Default, PartialEq)]
    pub struct Inventory {
        pub owner: Profile,
        pub counts: BTreeMap<String, u16>,
        pub history: Vec<Node>,
    }
}

fn account() -> Account {
    Account {
        id: 1,
        email: "a@b".into(),
        token: "t".into(),
        secret: Some("s".into()),
        instances: 3,
        cache: vec![1, 2, 3],
        status: Status::Active,
        tags: vec!["x".into()],
    }
}

fn profile() -> Profile {
    Profile {
        name: "Ann".into(),
        nickname: None,
        bio: String::new(),
    }
}

#[test]
fn unknown_fields_are_discarded() {
    let foo: Foo = from_bytes_as(br#"O:3:"Foo":2:{s:1:"a";i:1;s:1:"z";i:2;}"#).unwrap();
    assert_eq!(foo, Foo { a: 1 });

    // Nested unknown values are consumed whole
    let foo: Foo =
        from_bytes_as(br#"O:3:"Foo":2:{s:1:"z";a:1:{i:0;O:3:"Bar":0:{}}s:1:"a";i:9;}"#).unwrap();
    assert_eq!(foo.a, 9);
}

#[test]
fn missing_fields_keep_defaults() {
    let profile: Profile = from_bytes_as(br#"O:7:"Profile":1:{s:4:"name";s:3:"Bob";}"#).unwrap();
    assert_eq!(profile.name, "Bob");
    assert_eq!(profile.nickname, None);
    assert_eq!(profile.bio, "");
}

#[test]
fn class_name_does_not_drive_binding() {
    let foo: Foo = from_bytes_as(br#"O:8:"stdClass":1:{s:1:"a";i:4;}"#).unwrap();
    assert_eq!(foo.a, 4);
}

#[test]
fn default_encoding_is_public_instance_only() {
    let bytes = to_bytes(&account()).unwrap();
    let expected: &[u8] = b"O:11:\"App\\Account\":4:{\
        s:2:\"id\";i:1;\
        s:13:\"email_address\";s:3:\"a@b\";\
        s:6:\"status\";s:6:\"Active\";\
        s:4:\"tags\";a:1:{i:0;s:1:\"x\";}}";
    assert_eq!(bytes, expected);

    let back: Account = from_bytes_as(&bytes).unwrap();
    assert_eq!(back.email, "a@b");
    assert_eq!(back.token, "");
    assert_eq!(back.secret, None);
    assert_eq!(back.instances, 0);
    assert!(back.cache.is_empty());
}

#[test]
fn private_and_static_members_on_request() {
    let config = EncodeConfig {
        include_private: true,
        include_static: true,
        ..Default::default()
    };
    let bytes = to_bytes_with_config(&account(), &config).unwrap();
    let value = from_bytes(&bytes).unwrap();
    let properties = value.properties().unwrap();
    assert_eq!(properties.len(), 7);

    let secret = properties.iter().find(|p| p.name == "secret").unwrap();
    assert_eq!(secret.declaring_class.as_deref(), Some("App\\Account"));
    let token = properties.iter().find(|p| p.name == "token").unwrap();
    assert_eq!(token.visibility, Visibility::Protected);

    let back: Account = from_bytes_as(&bytes).unwrap();
    assert_eq!(back, Account { cache: Vec::new(), ..account() });
}

#[test]
fn skip_null_members_keeps_count_consistent() {
    assert_eq!(
        to_bytes(&profile()).unwrap(),
        br#"O:7:"Profile":3:{s:4:"name";s:3:"Ann";s:8:"nickname";N;s:3:"bio";s:0:"";}"#
    );

    let skip = EncodeConfig {
        skip_null_members: true,
        ..Default::default()
    };
    assert_eq!(
        to_bytes_with_config(&profile(), &skip).unwrap(),
        br#"O:7:"Profile":2:{s:4:"name";s:3:"Ann";s:3:"bio";s:0:"";}"#
    );

    let collapse = EncodeConfig {
        skip_null_members: true,
        empty_string_as_null: true,
        ..Default::default()
    };
    let bytes = to_bytes_with_config(&profile(), &collapse).unwrap();
    assert_eq!(bytes, br#"O:7:"Profile":1:{s:4:"name";s:3:"Ann";}"#);
    assert_eq!(from_bytes_as::<Profile>(&bytes).unwrap(), profile());
}

#[test]
fn empty_string_collapse_round_trips() {
    let config = EncodeConfig {
        empty_string_as_null: true,
        ..Default::default()
    };
    let bytes = to_bytes_with_config(&profile(), &config).unwrap();
    assert_eq!(
        bytes,
        br#"O:7:"Profile":3:{s:4:"name";s:3:"Ann";s:8:"nickname";N;s:3:"bio";N;}"#
    );
    assert_eq!(from_bytes_as::<Profile>(&bytes).unwrap(), profile());
}

#[test]
fn self_referential_records() {
    let list = Node {
        value: 1,
        next: Some(Box::new(Node {
            value: 2,
            next: None,
        })),
    };
    let bytes = to_bytes(&list).unwrap();
    assert_eq!(
        bytes,
        br#"O:4:"Node":2:{s:5:"value";i:1;s:4:"next";O:4:"Node":2:{s:5:"value";i:2;s:4:"next";N;}}"#
    );
    assert_eq!(from_bytes_as::<Node>(&bytes).unwrap(), list);
}

#[test]
fn nested_records_and_collections() {
    let inventory = Inventory {
        owner: profile(),
        counts: [("apple".to_string(), 3), ("pear".to_string(), 500)]
            .into_iter()
            .collect(),
        history: vec![Node { value: 7, next: None }],
    };
    let bytes = to_bytes(&inventory).unwrap();
    let back: Inventory = from_bytes_as(&bytes).unwrap();
    assert_eq!(back, inventory);

    // Re-encoding the untyped tree reproduces the same bytes
    let value = from_bytes(&bytes).unwrap();
    assert_eq!(value_to_bytes(&value), bytes);
}

#[test]
fn field_type_mismatch_reports_offset() {
    let err = from_bytes_as::<Node>(br#"O:4:"Node":1:{s:5:"value";s:1:"x";}"#).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::TypeMismatch {
            expected: "i32".into(),
            found: "string"
        }
    );
    assert_eq!(err.position, Some(26));
}

#[test]
fn enum_field_rejects_unknown_case() {
    let data = br#"O:11:"App\Account":1:{s:6:"status";s:4:"Gone";}"#;
    let err = from_bytes_as::<Account>(data).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ConversionError { .. }));
    assert!(err.position.is_some());
}

#[test]
fn string_length_counts_bytes() {
    let bytes = to_bytes(&"héllo".to_string()).unwrap();
    assert_eq!(bytes, "s:6:\"héllo\";".as_bytes());

    let value = from_bytes(&bytes).unwrap();
    assert_eq!(value.byte_len(), Some(6));
    assert_eq!(value.as_str(), Some("héllo"));
}

#[test]
fn array_disambiguation() {
    assert_eq!(
        from_bytes(b"a:3:{i:0;i:10;i:1;i:20;i:2;i:30;}").unwrap(),
        PhpValue::List(vec![PhpValue::Int(10), PhpValue::Int(20), PhpValue::Int(30)])
    );
    assert_eq!(
        from_bytes(br#"a:2:{s:1:"x";i:1;s:1:"y";i:2;}"#).unwrap(),
        PhpValue::Map(vec![
            (ArrayKey::from("x"), PhpValue::Int(1)),
            (ArrayKey::from("y"), PhpValue::Int(2)),
        ])
    );
    let err = from_bytes(b"a:2:{i:0;i:1;i:5;i:2;}").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MalformedArray(_)));

    // A typed sequence never goes through the guess
    assert_eq!(
        from_bytes_seq::<i32>(b"a:3:{i:0;i:10;i:1;i:20;i:2;i:30;}").unwrap(),
        [10, 20, 30]
    );
}

#[test]
fn null_handling() {
    assert_eq!(from_bytes_as::<Option<i32>>(b"N;").unwrap(), None);
    let err = from_bytes_as::<i32>(b"N;").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn truncated_string_is_length_mismatch() {
    let err = from_bytes(b"s:10:\"abc\";").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LengthMismatch {
            expected: 10,
            found: 3,
            ..
        }
    ));
}

#[test]
fn encoder_output_is_idempotent() {
    let encoded = [
        to_bytes(&account()).unwrap(),
        to_bytes(&vec![Some(1.5_f64), None]).unwrap(),
        to_bytes(&Status::Suspended).unwrap(),
        to_bytes(&BTreeMap::from([("c".to_string(), 3_i32), ("a".to_string(), 1)])).unwrap(),
    ];
    for bytes in encoded {
        let value = from_bytes(&bytes).unwrap();
        let again = value_to_bytes(&value);
        assert_eq!(again, bytes);
        assert_eq!(value_to_bytes(&from_bytes(&again).unwrap()), bytes);
    }
}

#[test]
fn record_descriptor_is_built_once() {
    let (TypeDescriptor::Record(first), TypeDescriptor::Record(second)) =
        (Node::descriptor(), Node::descriptor())
    else {
        panic!("records describe as records");
    };
    assert!(std::ptr::eq(first, second));
    assert_eq!(first.members.len(), 2);
}

#[test]
fn protected_members_need_include_private() {
    php_record! {
        #[derive(Debug, Default, PartialEq)]
        struct Session {
            pub id: i32,
            pub(crate) token: String,
        }
    }

    let session = Session {
        id: 1,
        token: "t".into(),
    };
    assert_eq!(
        to_bytes(&session).unwrap(),
        br#"O:7:"Session":1:{s:2:"id";i:1;}"#
    );

    let config = EncodeConfig {
        include_private: true,
        ..Default::default()
    };
    let bytes = to_bytes_with_config(&session, &config).unwrap();
    assert_eq!(bytes, b"O:7:\"Session\":2:{s:2:\"id\";i:1;s:8:\"\0*\0token\";s:1:\"t\";}");
    assert_eq!(from_bytes_as::<Session>(&bytes).unwrap(), session);
}
