//! # Twirpgen Fixtures
//!
//! **INTERNAL USE ONLY**: This crate exists solely to provide descriptor sets and
//! `CodeGeneratorRequest`s for testing the `twirpgen` plugin and its core library.
//! It is not intended for production use.
//!
//! Descriptors are assembled directly as `prost_types` protos, the same shape `protoc`
//! hands to a plugin, so the tests never need a `protoc` binary.
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileOptions, MessageOptions, MethodDescriptorProto, OneofDescriptorProto,
    ServiceDescriptorProto, SourceCodeInfo,
    compiler::CodeGeneratorRequest,
    field_descriptor_proto::{Label, Type},
    source_code_info::Location,
};

pub use prost_types;

// Field numbers inside `FileDescriptorProto` / `ServiceDescriptorProto` used by source info paths.
const FILE_SERVICE_FIELD: i32 = 6;
const SERVICE_METHOD_FIELD: i32 = 2;

/// The type of a message field.
#[derive(Debug, Clone)]
pub enum FieldType {
    Scalar(Type),
    /// Fully qualified message name without the leading dot, e.g. `pkg.a.Options`.
    Message(String),
    /// Fully qualified enum name without the leading dot.
    Enum(String),
}

impl FieldType {
    pub fn message(name: &str) -> Self {
        FieldType::Message(name.to_string())
    }

    pub fn enumeration(name: &str) -> Self {
        FieldType::Enum(name.to_string())
    }

    fn apply(&self, proto: &mut FieldDescriptorProto) {
        match self {
            FieldType::Scalar(ty) => proto.r#type = Some(*ty as i32),
            FieldType::Message(name) => {
                proto.r#type = Some(Type::Message as i32);
                proto.type_name = Some(format!(".{name}"));
            }
            FieldType::Enum(name) => {
                proto.r#type = Some(Type::Enum as i32);
                proto.type_name = Some(format!(".{name}"));
            }
        }
    }
}

pub const STRING: FieldType = FieldType::Scalar(Type::String);
pub const INT32: FieldType = FieldType::Scalar(Type::Int32);
pub const INT64: FieldType = FieldType::Scalar(Type::Int64);
pub const UINT64: FieldType = FieldType::Scalar(Type::Uint64);
pub const BOOL: FieldType = FieldType::Scalar(Type::Bool);
pub const BYTES: FieldType = FieldType::Scalar(Type::Bytes);
pub const DOUBLE: FieldType = FieldType::Scalar(Type::Double);

#[derive(Debug, Clone)]
enum Shape {
    Singular,
    Required,
    Repeated,
    Optional,
    Map(FieldType, FieldType),
    Oneof(String),
}

#[derive(Debug, Clone)]
struct FieldDef {
    name: String,
    ty: FieldType,
    shape: Shape,
}

/// Builds a `DescriptorProto`. Field numbers follow declaration order starting at 1.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    name: String,
    fields: Vec<FieldDef>,
    nested: Vec<MessageBuilder>,
}

impl MessageBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: vec![],
            nested: vec![],
        }
    }

    pub fn field(self, name: &str, ty: FieldType) -> Self {
        self.push(name, ty, Shape::Singular)
    }

    /// A proto2 `required` field.
    pub fn required(self, name: &str, ty: FieldType) -> Self {
        self.push(name, ty, Shape::Required)
    }

    pub fn repeated(self, name: &str, ty: FieldType) -> Self {
        self.push(name, ty, Shape::Repeated)
    }

    /// A proto3 `optional` field, backed by a synthetic oneof.
    pub fn optional(self, name: &str, ty: FieldType) -> Self {
        self.push(name, ty, Shape::Optional)
    }

    pub fn map(self, name: &str, key: FieldType, value: FieldType) -> Self {
        self.push(name, value.clone(), Shape::Map(key, value))
    }

    /// A field that belongs to the (real) oneof named `oneof`.
    pub fn oneof_field(self, oneof: &str, name: &str, ty: FieldType) -> Self {
        self.push(name, ty, Shape::Oneof(oneof.to_string()))
    }

    pub fn nested(mut self, message: MessageBuilder) -> Self {
        self.nested.push(message);
        self
    }

    fn push(mut self, name: &str, ty: FieldType, shape: Shape) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            ty,
            shape,
        });
        self
    }

    fn build(self, scope: &str) -> DescriptorProto {
        let full_name = qualify(scope, &self.name);
        let mut real_oneofs: Vec<String> = vec![];
        for def in &self.fields {
            if let Shape::Oneof(oneof) = &def.shape {
                if !real_oneofs.contains(oneof) {
                    real_oneofs.push(oneof.clone());
                }
            }
        }

        let mut oneof_decl: Vec<OneofDescriptorProto> = real_oneofs
            .iter()
            .map(|name| OneofDescriptorProto {
                name: Some(name.clone()),
                ..Default::default()
            })
            .collect();
        let mut nested_type: Vec<DescriptorProto> = vec![];
        let mut field = vec![];

        for (index, def) in self.fields.into_iter().enumerate() {
            let mut proto = FieldDescriptorProto {
                name: Some(def.name.clone()),
                number: Some(index as i32 + 1),
                label: Some(Label::Optional as i32),
                ..Default::default()
            };
            def.ty.apply(&mut proto);

            match def.shape {
                Shape::Singular => {}
                Shape::Required => proto.label = Some(Label::Required as i32),
                Shape::Repeated => proto.label = Some(Label::Repeated as i32),
                Shape::Optional => {
                    proto.proto3_optional = Some(true);
                    proto.oneof_index = Some(oneof_decl.len() as i32);
                    oneof_decl.push(OneofDescriptorProto {
                        name: Some(format!("_{}", def.name)),
                        ..Default::default()
                    });
                }
                Shape::Oneof(oneof) => {
                    let position = real_oneofs.iter().position(|o| *o == oneof).unwrap_or(0);
                    proto.oneof_index = Some(position as i32);
                }
                Shape::Map(key, value) => {
                    let entry_name = format!("{}Entry", camel(&def.name));
                    let entry = MessageBuilder::new(&entry_name)
                        .field("key", key)
                        .field("value", value);
                    let mut entry = entry.build(&full_name);
                    entry.options = Some(MessageOptions {
                        map_entry: Some(true),
                        ..Default::default()
                    });
                    nested_type.push(entry);

                    proto.label = Some(Label::Repeated as i32);
                    proto.r#type = Some(Type::Message as i32);
                    proto.type_name = Some(format!(".{full_name}.{entry_name}"));
                }
            }
            field.push(proto);
        }

        nested_type.extend(self.nested.into_iter().map(|m| m.build(&full_name)));

        DescriptorProto {
            name: Some(self.name),
            field,
            nested_type,
            oneof_decl,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
struct MethodDef {
    name: String,
    input: String,
    output: String,
    client_streaming: bool,
    server_streaming: bool,
    doc: Option<String>,
}

/// Builds a `ServiceDescriptorProto` together with its method documentation.
#[derive(Debug, Clone)]
pub struct ServiceBuilder {
    name: String,
    methods: Vec<MethodDef>,
}

impl ServiceBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            methods: vec![],
        }
    }

    /// Adds a unary method. `input` and `output` are fully qualified message names.
    pub fn unary(self, name: &str, input: &str, output: &str) -> Self {
        self.streaming(name, input, output, false, false)
    }

    /// Adds a unary method carrying a leading comment (as `protoc` records it).
    pub fn documented(mut self, name: &str, input: &str, output: &str, doc: &str) -> Self {
        self = self.unary(name, input, output);
        if let Some(method) = self.methods.last_mut() {
            method.doc = Some(doc.to_string());
        }
        self
    }

    pub fn streaming(
        mut self,
        name: &str,
        input: &str,
        output: &str,
        client_streaming: bool,
        server_streaming: bool,
    ) -> Self {
        self.methods.push(MethodDef {
            name: name.to_string(),
            input: input.to_string(),
            output: output.to_string(),
            client_streaming,
            server_streaming,
            doc: None,
        });
        self
    }
}

/// Builds a `FileDescriptorProto`, proto3 unless [`FileBuilder::proto2`] is called.
#[derive(Debug, Clone)]
pub struct FileBuilder {
    name: String,
    package: String,
    syntax: &'static str,
    go_package: Option<String>,
    dependencies: Vec<String>,
    messages: Vec<MessageBuilder>,
    enums: Vec<(String, Vec<String>)>,
    services: Vec<ServiceBuilder>,
}

impl FileBuilder {
    pub fn new(name: &str, package: &str) -> Self {
        Self {
            name: name.to_string(),
            package: package.to_string(),
            syntax: "proto3",
            go_package: None,
            dependencies: vec![],
            messages: vec![],
            enums: vec![],
            services: vec![],
        }
    }

    /// Declares `syntax = "proto2"`: singular fields then track presence.
    pub fn proto2(mut self) -> Self {
        self.syntax = "proto2";
        self
    }

    pub fn go_package(mut self, go_package: &str) -> Self {
        self.go_package = Some(go_package.to_string());
        self
    }

    pub fn import(mut self, dependency: &str) -> Self {
        self.dependencies.push(dependency.to_string());
        self
    }

    pub fn message(mut self, message: MessageBuilder) -> Self {
        self.messages.push(message);
        self
    }

    pub fn enumeration(mut self, name: &str, values: &[&str]) -> Self {
        self.enums.push((
            name.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    pub fn service(mut self, service: ServiceBuilder) -> Self {
        self.services.push(service);
        self
    }

    pub fn build(self) -> FileDescriptorProto {
        let mut locations = vec![];
        let service = self
            .services
            .into_iter()
            .enumerate()
            .map(|(service_index, service)| {
                let method = service
                    .methods
                    .into_iter()
                    .enumerate()
                    .map(|(method_index, def)| {
                        if let Some(doc) = def.doc {
                            locations.push(Location {
                                path: vec![
                                    FILE_SERVICE_FIELD,
                                    service_index as i32,
                                    SERVICE_METHOD_FIELD,
                                    method_index as i32,
                                ],
                                span: vec![0, 0, 0],
                                leading_comments: Some(doc),
                                ..Default::default()
                            });
                        }
                        MethodDescriptorProto {
                            name: Some(def.name),
                            input_type: Some(format!(".{}", def.input)),
                            output_type: Some(format!(".{}", def.output)),
                            client_streaming: Some(def.client_streaming),
                            server_streaming: Some(def.server_streaming),
                            ..Default::default()
                        }
                    })
                    .collect();
                ServiceDescriptorProto {
                    name: Some(service.name),
                    method,
                    ..Default::default()
                }
            })
            .collect();

        let enum_type = self
            .enums
            .into_iter()
            .map(|(name, values)| EnumDescriptorProto {
                name: Some(name),
                value: values
                    .into_iter()
                    .enumerate()
                    .map(|(number, value)| EnumValueDescriptorProto {
                        name: Some(value),
                        number: Some(number as i32),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            })
            .collect();

        let package = self.package;
        FileDescriptorProto {
            name: Some(self.name),
            package: Some(package.clone()),
            dependency: self.dependencies,
            message_type: self
                .messages
                .into_iter()
                .map(|m| m.build(&package))
                .collect(),
            enum_type,
            service,
            options: self.go_package.map(|go_package| FileOptions {
                go_package: Some(go_package),
                ..Default::default()
            }),
            source_code_info: (!locations.is_empty()).then_some(SourceCodeInfo {
                location: locations,
            }),
            syntax: Some(self.syntax.to_string()),
            ..Default::default()
        }
    }
}

/// Assembles a `CodeGeneratorRequest` the way `protoc` does: every file (dependencies first)
/// in `proto_file`, and the names of the files to generate for in `file_to_generate`.
pub fn request(
    files: Vec<FileDescriptorProto>,
    file_to_generate: &[&str],
    parameter: Option<&str>,
) -> CodeGeneratorRequest {
    CodeGeneratorRequest {
        file_to_generate: file_to_generate.iter().map(|f| f.to_string()).collect(),
        parameter: parameter.map(str::to_string),
        proto_file: files,
        ..Default::default()
    }
}

/// `pkg/a/greeter.proto`: the canonical single-service, single-method fixture.
pub fn greeter_file() -> FileDescriptorProto {
    FileBuilder::new("pkg/a/greeter.proto", "pkg.a")
        .go_package("pkg/a")
        .message(MessageBuilder::new("SayHelloRequest").field("name", STRING))
        .message(MessageBuilder::new("SayHelloResponse").field("greeting", STRING))
        .service(ServiceBuilder::new("Greeter").documented(
            "SayHello",
            "pkg.a.SayHelloRequest",
            "pkg.a.SayHelloResponse",
            " SayHello greets the caller by name.\n",
        ))
        .build()
}

/// A request generating for [`greeter_file`] only.
pub fn greeter_request() -> CodeGeneratorRequest {
    request(vec![greeter_file()], &["pkg/a/greeter.proto"], None)
}

/// Two files sharing the `pkg/b` Go package, each declaring one service.
pub fn split_package_files() -> Vec<FileDescriptorProto> {
    let users = FileBuilder::new("pkg/b/users.proto", "pkg.b")
        .go_package("pkg/b")
        .message(MessageBuilder::new("GetUserRequest").field("id", STRING))
        .message(
            MessageBuilder::new("GetUserResponse")
                .field("name", STRING)
                .field("age", INT32),
        )
        .service(ServiceBuilder::new("UserService").unary(
            "GetUser",
            "pkg.b.GetUserRequest",
            "pkg.b.GetUserResponse",
        ))
        .build();

    let teams = FileBuilder::new("pkg/b/teams.proto", "pkg.b")
        .go_package("pkg/b")
        .message(MessageBuilder::new("ListTeamsRequest"))
        .message(MessageBuilder::new("ListTeamsResponse").repeated("names", STRING))
        .service(ServiceBuilder::new("TeamService").unary(
            "ListTeams",
            "pkg.b.ListTeamsRequest",
            "pkg.b.ListTeamsResponse",
        ))
        .build();

    vec![users, teams]
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

// Mirrors protoc's map entry naming: `labels` -> `LabelsEntry`, `foo_bar` -> `FooBarEntry`.
fn camel(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}
