//! The file-level file: for each service of one proto file, an unexported struct wrapping the
//! Twirp client, with one method per RPC taking the request fields as parameters and
//! returning the response fields.
use super::UnitContext;
use crate::{
    comments::leading_comment_lines,
    emit::{EmittedArtifact, GoFile},
    error::GenerateError,
    flatten::{Parameter, error_return, flatten_fields, flatten_parameters, flatten_returns},
    naming::go_camel_case,
    resolver::NameScope,
    shape::{UnaryMethod, validate},
    unit::GoPackageFile,
};
use prost_reflect::ServiceDescriptor;

// Signatures with more entries than this are written one entry per line.
const INLINE_SIGNATURE_LIMIT: usize = 2;

pub(crate) fn generate(
    context: &UnitContext<'_>,
    package_file: &GoPackageFile,
) -> Result<EmittedArtifact, GenerateError> {
    let name = context.layout.service_file_name(&package_file.file)?;
    let mut file = context.go_file(name, Some(package_file.file.name().to_string()));

    for service in package_file.services() {
        wrapper(&mut file, context, &service)?;
    }

    Ok(file.finish())
}

fn wrapper(
    file: &mut GoFile,
    context: &UnitContext<'_>,
    service: &ServiceDescriptor,
) -> Result<(), GenerateError> {
    let struct_name = context.wrapper_name(service);
    let logger = file.ident(&context.logger_ident())?;
    // The Twirp interface is named after the service, without a `Client` suffix.
    let client = file.ident(&context.layout.base.ident(go_camel_case(service.name())))?;

    file.line(format!("type {struct_name} struct {{"));
    file.line(format!("logger *{logger}"));
    file.line(format!("client {client}"));
    file.line("}");
    file.blank();

    for method in service.methods() {
        let method = validate(&method)?;
        wrapper_method(file, context, &struct_name, &method)?;
    }
    file.blank();

    Ok(())
}

fn wrapper_method(
    file: &mut GoFile,
    context: &UnitContext<'_>,
    struct_name: &str,
    method: &UnaryMethod,
) -> Result<(), GenerateError> {
    let method_name = go_camel_case(method.descriptor().name());
    let ctx_type = file.ident(&context.context_ident())?;
    let request = file.ident(&context.packages.message_ident(&method.input())?)?;
    let inputs = flatten_fields(&method.input(), context.packages, file.resolver())?;
    let outputs = flatten_fields(&method.output(), context.packages, file.resolver())?;

    // Every alias the signature may reference is bound by now.
    let mut scope = NameScope::for_signature(file.resolver());
    let parameters = flatten_parameters(&inputs, &mut scope);
    let returns = flatten_returns(&outputs, &mut scope);

    let signature_params: Vec<String> = std::iter::once(format!("ctx {ctx_type}"))
        .chain(parameters.iter().map(Parameter::declaration))
        .collect();
    let signature_returns: Vec<String> = returns
        .iter()
        .map(Parameter::declaration)
        .chain(std::iter::once("_ error".to_string()))
        .collect();

    for line in leading_comment_lines(method.descriptor()) {
        file.line(line);
    }
    if signature_params.len() > INLINE_SIGNATURE_LIMIT
        || signature_returns.len() > INLINE_SIGNATURE_LIMIT
    {
        file.line(format!("func (s *{struct_name}) {method_name}("));
        for param in &signature_params {
            file.line(format!("{param},"));
        }
        file.line(format!(") ({}) {{", signature_returns.join(", ")));
    } else {
        file.line(format!(
            "func (s *{struct_name}) {method_name}({}) ({}) {{",
            signature_params.join(", "),
            signature_returns.join(", ")
        ));
    }

    if returns.is_empty() {
        file.line(format!("_, err := s.client.{method_name}("));
    } else {
        file.line(format!("response, err := s.client.{method_name}("));
    }
    file.line("ctx,");
    file.line(format!("&{request}{{"));
    for (field, parameter) in inputs.iter().zip(&parameters) {
        file.line(format!("{}: {},", field.go_name, parameter.name));
    }
    file.line("},");
    file.line(")");
    file.line("if err != nil {");
    file.line(error_return(&returns, "err"));
    file.line("}");

    let values: Vec<String> = outputs
        .iter()
        .map(|field| format!("response.{}", field.go_name))
        .chain(std::iter::once("nil".to_string()))
        .collect();
    file.line(format!("return {}", values.join(", ")));
    file.line("}");
    file.blank();

    Ok(())
}
