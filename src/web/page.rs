use html_escape::encode_text;

use crate::domain::statement::StatementPair;

const PLACEHOLDER: &str =
    "E.g., Kia recalls 80,000 vehicles due to faulty wiring, improper air bag deployment";

/// Everything the page can show after (or before) a run.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub description: &'a str,
    pub statements: Option<&'a StatementPair>,
    pub partial_crisis_statement: Option<&'a str>,
    pub error: Option<String>,
}

pub fn render(view: &PageView<'_>) -> String {
    let mut body = String::new();

    if let Some(error) = &view.error {
        body.push_str(&format!(
            "<div class=\"error\" role=\"alert\">{}</div>\n",
            encode_text(error)
        ));
    }

    let crisis = view
        .statements
        .map(|pair| pair.crisis_statement.as_str())
        .or(view.partial_crisis_statement);
    if let Some(text) = crisis {
        body.push_str(&section("crisis-statement", "Crisis Management Statement", text));
    }
    if let Some(pair) = view.statements {
        body.push_str(&section(
            "legal-statement",
            "Final Legal-Safe Press Statement",
            &pair.legal_statement,
        ));
        body.push_str("<p class=\"success\">Legally safe press statement generated!</p>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Crisis Management Workflow</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }}
textarea {{ width: 100%; min-height: 8rem; }}
.statement {{ white-space: pre-wrap; border-left: 4px solid #888; padding-left: 1rem; }}
#crisis-statement .statement {{ border-color: #c0392b; }}
#legal-statement .statement {{ border-color: #2c6fbb; }}
.error {{ color: #a00; border: 1px solid #a00; padding: 0.5rem; }}
.success {{ color: #276738; }}
</style>
</head>
<body>
<h1>Crisis Management Workflow</h1>
<p>Describe a crisis and get two press statements: a crisis management statement that
acknowledges the issue and reassures stakeholders, and a legally safe revision that avoids
admissions of fault or liability.</p>
<form method="post" action="/statements">
<label for="description">Describe the crisis scenario:</label>
<textarea id="description" name="description" placeholder="{placeholder}">{description}</textarea>
<button type="submit">Generate Statements</button>
</form>
{body}</body>
</html>
"#,
        placeholder = PLACEHOLDER,
        description = encode_text(view.description),
    )
}

fn section(id: &str, title: &str, text: &str) -> String {
    format!(
        "<section id=\"{id}\">\n<h2>{title}</h2>\n<div class=\"statement\">{}</div>\n</section>\n",
        encode_text(text)
    )
}
