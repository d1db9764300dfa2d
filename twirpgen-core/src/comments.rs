//! Leading comments of methods, read from the file's `source_code_info`.
use prost_reflect::MethodDescriptor;

// Field numbers of `FileDescriptorProto.service` and `ServiceDescriptorProto.method`.
const FILE_SERVICE_FIELD: i32 = 6;
const SERVICE_METHOD_FIELD: i32 = 2;

/// The method's leading comment as Go line comments, verbatim (`//` + each source line).
/// Empty when the method has no leading comment.
pub fn leading_comment_lines(method: &MethodDescriptor) -> Vec<String> {
    let path = [
        FILE_SERVICE_FIELD,
        method.parent_service().index() as i32,
        SERVICE_METHOD_FIELD,
        method.index() as i32,
    ];

    let file = method.parent_file();
    let comment = file
        .file_descriptor_proto()
        .source_code_info
        .as_ref()
        .and_then(|info| info.location.iter().find(|l| l.path == path))
        .and_then(|location| location.leading_comments.as_deref())
        .unwrap_or_default();

    if comment.is_empty() {
        return vec![];
    }

    comment
        .strip_suffix('\n')
        .unwrap_or(comment)
        .split('\n')
        .map(|line| format!("//{line}"))
        .collect()
}
