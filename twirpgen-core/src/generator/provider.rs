//! The unit-level file: a `provider` implementing the `apiclient.Provider` interface, with one
//! `New<Service>` factory per service of the unit.
use super::UnitContext;
use crate::{
    emit::{EmittedArtifact, GoFile},
    error::GenerateError,
    naming::go_camel_case,
    unit::{PROVIDER_CONSTRUCTOR, PROVIDER_TYPE},
};
use prost_reflect::ServiceDescriptor;

pub(crate) fn generate(context: &UnitContext<'_>) -> Result<EmittedArtifact, GenerateError> {
    let name = context.layout.unit_file_name(context.unit)?;
    let source = match context.unit.files.as_slice() {
        [only] => Some(only.file.name().to_string()),
        _ => None,
    };
    let mut file = context.go_file(name, source);

    let http_client = file.ident(&context.http_client_ident())?;
    let logger = file.ident(&context.logger_ident())?;
    let provider_interface = file.ident(&context.layout.apiclient.ident("Provider"))?;

    file.line(format!("// {PROVIDER_CONSTRUCTOR} returns a new Provider."));
    file.line(format!("func {PROVIDER_CONSTRUCTOR}("));
    file.line(format!("logger *{logger},"));
    file.line(format!("httpClient {http_client},"));
    file.line(format!(") {provider_interface} {{"));
    file.line(format!("return &{PROVIDER_TYPE}{{"));
    file.line("logger: logger,");
    file.line("httpClient: httpClient,");
    file.line("}");
    file.line("}");
    file.blank();
    file.line(format!("type {PROVIDER_TYPE} struct {{"));
    file.line(format!("logger *{logger}"));
    file.line(format!("httpClient {http_client}"));
    file.line("}");
    file.blank();

    for service in context.unit.services() {
        factory(&mut file, context, &service)?;
    }

    Ok(file.finish())
}

fn factory(
    file: &mut GoFile,
    context: &UnitContext<'_>,
    service: &ServiceDescriptor,
) -> Result<(), GenerateError> {
    let service_name = go_camel_case(service.name());
    let wrapper = context.wrapper_name(service);

    let ctx_type = file.ident(&context.context_ident())?;
    let interface = file.ident(&context.layout.api.ident(&service_name))?;
    let constructor = file.ident(
        &context
            .layout
            .base
            .ident(format!("New{service_name}ProtobufClient")),
    )?;
    let client_options = file.ident(&context.new_client_options_ident())?;

    file.line(format!(
        "func (p *{PROVIDER_TYPE}) New{service_name}(ctx {ctx_type}, address string) ({interface}, error) {{"
    ));
    file.line(format!("return &{wrapper}{{"));
    file.line("logger: p.logger,");
    file.line(format!("client: {constructor}("));
    file.line("p.httpClient.ParseAddress(address),");
    file.line("p.httpClient,");
    file.line(format!("{client_options}()...,"));
    file.line("),");
    file.line("}, nil");
    file.line("}");
    file.blank();

    Ok(())
}
