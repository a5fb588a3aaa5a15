//! Stability tests: idempotence, markup preservation and safety ceilings
//! over a corpus of well-formed and malformed documents.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use aspfmt::{detect_regions, Config, DiagnosticKind, FormatService, SafetyLimits};
use pretty_assertions::assert_eq;

const CORPUS: &[&str] = &[
    "",
    "<html><body>no script</body></html>\n",
    "<p>hi</p><%=1%>text",
    "<%\nif x then\ny = 1\nend if\n%>",
    "<%\r\nselect case v\r\ncase 1\r\nx=1\r\ncase else\r\nx=2\r\nend select\r\n%>\r\n",
    "<ul>\n<% for each item in list %>\n  <li><%= item %></li>\n<% next %>\n</ul>\n",
    "<%\nsub A()\nend sub\nsub B()\nend sub\nfunction C(x)\nC = x*2\nend function\n%>\n",
    "<%\n' header comment\n   rem another\nclass Foo\npublic default property get Bar\nbar = 1\nend property\nend class\n%>",
    "<%\nfor i=1 to 10\nx = i\n",
    "<%\nend if\nnext\nwend\nloop\n%>",
    "<%\nif a then\nfor i = 1 to 3\nend if\nnext\n%>",
    "<%\nmsg = \"unterminated\n%>\n<b>after</b>",
    "<%\nx = a &_\n\"b\" & _\n\"c\"\n%>",
    "<%\nfor i = 1 to 3: s = s + i: next\ndo while x<3\nx=x+1\nloop\n%>",
    "<%\nif x then ' start\nresponse.write \"<%= not code %>\"\nend if\n%>",
    "<% @language=\"VBScript\" %>\n<%\non error resume next\nset rs = server.createobject(\"ADODB.Recordset\")\n%>",
    "text <% %> more <%\n\n\n%> tail",
    "<%\n\tif   a<>b   then\n\t\t\tc=d&e\n\tend   if\n%>",
    "<%\nx = #1/1/2000# + 1\nif x>=#2/2/2000# then y=-1\n%>",
    "%> stray close <% stray open",
];

fn markup_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut pos = 0;
    for span in detect_regions(text) {
        segments.push(&text[pos..span.start]);
        pos = span.end;
    }
    segments.push(&text[pos..]);
    segments
}

#[test]
fn test_idempotence() {
    let service = FormatService::default();
    for doc in CORPUS {
        let once = service.format(doc);
        let twice = service.format(&once);
        assert_eq!(twice, once, "input: {doc:?}");
    }
}

#[test]
fn test_idempotence_with_options_disabled() {
    let config = Config {
        indent: 2,
        impose_case: false,
        impose_whitespace: false,
        ..Config::default()
    };
    let service = FormatService::new(config);
    for doc in CORPUS {
        let once = service.format(doc);
        assert_eq!(service.format(&once), once, "input: {doc:?}");
    }
}

#[test]
fn test_markup_preservation() {
    let service = FormatService::default();
    for doc in CORPUS {
        let output = service.format(doc);
        assert_eq!(
            markup_segments(&output),
            markup_segments(doc),
            "input: {doc:?}"
        );
    }
}

#[test]
fn test_script_free_documents_echoed() {
    let service = FormatService::default();
    for doc in ["", "plain text", "<div>\r\n  x  \r\n</div>", "%> <%"] {
        let output = service.format_document("plain", doc);
        assert_eq!(output.text, doc);
        assert!(!output.changed);
    }
}

#[test]
fn test_text_length_ceiling() {
    let config = Config {
        limits: SafetyLimits {
            max_text_length: 16,
            ..SafetyLimits::default()
        },
        ..Config::default()
    };
    let input = "<%\nif a then\nb=1\nend if\n%>";
    let output = FormatService::new(config).format_document("big", input);
    assert_eq!(output.text, input);
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].kind, DiagnosticKind::LimitReached);
}

#[test]
fn test_line_ceiling_passes_tail_through() {
    let config = Config {
        limits: SafetyLimits {
            max_lines: 3,
            ..SafetyLimits::default()
        },
        ..Config::default()
    };
    let input = "<%\nif a then\nb=1\nc=2\nend if\n%>";
    let output = FormatService::new(config).format_document("long", input);
    assert!(output.text.starts_with("<%\nIf a Then\n    b = 1\n"));
    assert!(output.text.ends_with("c=2\nend if\n%>"));
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::LimitReached));
}

#[test]
fn test_token_ceiling_reindents_only() {
    let config = Config {
        limits: SafetyLimits {
            max_token_length: 12,
            ..SafetyLimits::default()
        },
        ..Config::default()
    };
    let input = "<%\nif a then\nresponse.write x&y&z\nend if\n%>";
    let output = FormatService::new(config).format_document("wide", input);
    assert_eq!(
        output.text,
        "<%\nIf a Then\n    response.write x&y&z\nEnd If\n%>"
    );
    assert_eq!(output.diagnostics[0].line_number, Some(3));
}

#[test]
fn test_adversarial_nesting_terminates() {
    let service = FormatService::default();
    let opens = "if a then\n".repeat(2_000);
    let closes = "end if\n".repeat(10);
    let input = format!("<%\n{opens}{closes}%>");
    let output = service.format_document("nested", &input);
    assert!(output.text.ends_with("%>"));
    assert_eq!(output.text.lines().count(), input.lines().count());
}
