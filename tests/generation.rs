use endpoint_generator::{File, GenerationOptions, Generator, GeneratorError, STANDARD_PLUGINS};

const ROUND_TRIP: &str = r##"{
  "openapi": "3.0.1",
  "info": { "title": "Round trip", "version": "1.0" },
  "paths": {
    "/Foo/bar": {
      "post": {
        "requestBody": {
          "content": {
            "application/json": {
              "schema": {
                "type": "object",
                "properties": { "name": { "type": "string", "nullable": true } }
              }
            }
          }
        },
        "responses": {
          "200": {
            "description": "",
            "content": { "application/json": { "schema": { "type": "string", "nullable": true } } }
          }
        }
      }
    }
  }
}"##;

const SHOP: &str = r##"
openapi: "3.0.1"
info:
  title: Shop
  version: "2"
paths:
  /ShapeEndpoint/largest:
    post:
      responses:
        "200":
          description: ""
          content:
            application/json:
              schema:
                nullable: true
                anyOf:
                  - $ref: "#/components/schemas/com.example.Shape"
components:
  schemas:
    com.example.Shape:
      oneOf:
        - $ref: "#/components/schemas/com.example.Circle"
        - $ref: "#/components/schemas/com.example.Square"
    com.example.Circle:
      type: object
      properties:
        radius:
          type: number
      required: [radius]
    com.example.Square:
      type: object
      properties:
        side:
          type: number
      required: [side]
    com.example.Node:
      type: object
      properties:
        value:
          type: string
        next:
          nullable: true
          anyOf:
            - $ref: "#/components/schemas/com.example.Node"
      required: [value]
"##;

fn generate(plugins: &[&str], input: &str) -> Result<Vec<File>, GeneratorError> {
    Generator::from_paths(plugins, GenerationOptions::default())?.process(input)
}

fn content<'f>(files: &'f [File], name: &str) -> &'f str {
    files
        .iter()
        .find(|file| file.name == name)
        .map(|file| file.content.as_str())
        .unwrap_or_else(|| panic!("{name} was not generated"))
}

#[test]
fn round_trip_generates_client_and_endpoint() {
    let files = generate(&["backbone", "client"], ROUND_TRIP).unwrap();

    let names: Vec<_> = files.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(names, ["FooEndpoint.ts", "connect-client.default.ts"]);

    let endpoint = content(&files, "FooEndpoint.ts");
    assert!(endpoint.contains(
        "async function bar(name: string | undefined, init?: EndpointRequestInit): Promise<string | undefined> {"
    ));
    assert!(endpoint.contains("return client.call(\"Foo\", \"bar\", { name }, init);"));
    assert!(endpoint.contains("import client from \"./connect-client.default.js\";"));
    assert!(endpoint.ends_with("export { bar };\n"));
}

#[test]
fn union_entity_becomes_alias() {
    let files = generate(&["backbone", "subtypes"], SHOP).unwrap();

    assert_eq!(
        content(&files, "com/example/Shape.ts"),
        "import type Circle from \"./Circle.js\";\nimport type Square from \"./Square.js\";\n\ntype Shape = Circle | Square;\n\nexport default Shape;\n"
    );
    assert!(content(&files, "ShapeEndpoint.ts")
        .contains("import type Shape from \"./com/example/Shape.js\";"));
}

#[test]
fn self_reference_needs_no_import() {
    let files = generate(&["backbone"], SHOP).unwrap();

    let node = content(&files, "com/example/Node.ts");
    assert!(!node.contains("import"));
    assert!(node.contains("next?: Node | undefined;"));
}

#[test]
fn standard_pipeline_is_deterministic() {
    let first = generate(&STANDARD_PLUGINS, SHOP).unwrap();
    let second = generate(&STANDARD_PLUGINS, SHOP).unwrap();
    assert_eq!(first, second);

    let names: Vec<_> = first.iter().map(|file| file.name.as_str()).collect();
    assert!(names.contains(&"endpoints.ts"));
    assert!(names.contains(&"com/example/CircleModel.ts"));
    assert!(!names.contains(&"com/example/ShapeModel.ts"));
}

#[test]
fn barrel_without_backbone_names_backbone() {
    let err = generate(&["barrel"], SHOP).unwrap_err();
    assert!(matches!(err.root_cause(), GeneratorError::Configuration { .. }));
    assert!(err.to_string().contains("backbone"));
}

#[test]
fn unknown_plugin_fails_before_generation() {
    let err = Generator::from_paths(&["backbone", "nope"], GenerationOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, GeneratorError::PluginLoad { ref path, .. } if path == "nope"));
}

#[test]
fn client_override_is_respected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("connect-client.ts"), "export default {};\n").unwrap();
    let options = GenerationOptions {
        output_dir: Some(dir.path().to_path_buf()),
        ..GenerationOptions::default()
    };

    let files = Generator::from_paths(&["backbone", "client"], options)
        .unwrap()
        .process(ROUND_TRIP)
        .unwrap();

    assert!(files.iter().all(|file| file.name != "connect-client.default.ts"));
    assert!(content(&files, "FooEndpoint.ts").contains("import client from \"./connect-client.js\";"));
}

#[test]
fn dangling_reference_is_a_document_error() {
    let input = ROUND_TRIP.replace(
        r#"{ "type": "string", "nullable": true } } }"#,
        r##"{ "$ref": "#/components/schemas/Missing" } } }"##,
    );
    let err = generate(&STANDARD_PLUGINS, &input).unwrap_err();
    assert!(err.is_document_error());
}

#[test]
fn alias_root_replaces_relative_imports() {
    let options = GenerationOptions {
        alias_root: Some("Frontend/generated".to_string()),
        ..GenerationOptions::default()
    };

    let files = Generator::from_paths(&["backbone", "client"], options)
        .unwrap()
        .process(SHOP)
        .unwrap();

    let endpoint = content(&files, "ShapeEndpoint.ts");
    assert!(endpoint.contains("import type Shape from \"Frontend/generated/com/example/Shape.js\";"));
    assert!(endpoint.contains("import client from \"Frontend/generated/connect-client.default.js\";"));
    assert!(!endpoint.contains("\"./"));
}
