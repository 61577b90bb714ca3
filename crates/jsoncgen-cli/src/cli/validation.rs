use jsoncgen::DocTypes;

/// Parse the `--doc-types` value.
///
/// Clap shows the returned message when the list holds an unknown name.
pub fn parse_doc_types(s: &str) -> Result<DocTypes, String> {
    s.parse::<DocTypes>().map_err(|err| {
        format!("{err}; expected a pipe-separated list of NotFields, NotStructFields, NotArrayFields, NotMapFields")
    })
}
