use std::sync::Arc;

use {
    anyhow::Result,
    conduit_config::ConduitConfig,
    conduit_connect::{
        ConnectionDraft, HttpSourceApi, SensitivityPolicy, SourceApi, SourceSchema,
        form::render_form, run_connect_wizard,
    },
    serde_json::{Value, json},
};

pub async fn handle_connect(config: &ConduitConfig, short_name: &str) -> Result<()> {
    let api: Arc<dyn SourceApi> = Arc::new(HttpSourceApi::new(&config.api)?);
    let policy = SensitivityPolicy::from_config(&config.wizard);

    match run_connect_wizard(api, short_name, policy).await? {
        Some(id) => println!("Connection {id} created."),
        None => eprintln!("No connection created."),
    }
    Ok(())
}

pub async fn handle_schema(config: &ConduitConfig, short_name: &str, as_json: bool) -> Result<()> {
    let api = HttpSourceApi::new(&config.api)?;
    let schema = api.fetch_schema(short_name).await?;
    let policy = SensitivityPolicy::from_config(&config.wizard);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&form_json(&schema, &policy))?);
    } else {
        print!("{}", form_table(&schema, &policy));
    }
    Ok(())
}

fn form_json(schema: &SourceSchema, policy: &SensitivityPolicy) -> Value {
    let draft = ConnectionDraft::for_schema(schema);
    let fields: Vec<Value> = render_form(schema, &draft)
        .into_iter()
        .zip(&schema.fields)
        .map(|(view, field)| {
            json!({
                "name": view.name,
                "label": view.label,
                "hint": view.hint,
                "input_type": view.input_type,
                "placeholder": view.placeholder,
                "sensitive": policy.is_sensitive(field),
            })
        })
        .collect();
    json!({
        "name": schema.name,
        "short_name": schema.short_name,
        "description": schema.description,
        "auth_type": schema.auth_type,
        "fields": fields,
    })
}

fn form_table(schema: &SourceSchema, policy: &SensitivityPolicy) -> String {
    let draft = ConnectionDraft::for_schema(schema);
    let rows: Vec<[String; 4]> = render_form(schema, &draft)
        .into_iter()
        .zip(&schema.fields)
        .map(|(view, field)| {
            let sensitive = if policy.is_sensitive(field) { "yes" } else { "" };
            [view.label, view.input_type, view.placeholder, sensitive.to_string()]
        })
        .collect();

    let header = ["FIELD", "TYPE", "PLACEHOLDER", "SENSITIVE"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format!("{} ({})\n", schema.name, schema.short_name);
    let mut push_line = |cells: [&str; 4]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };
    push_line(header);
    for row in &rows {
        push_line([&row[0], &row[1], &row[2], &row[3]]);
    }
    out
}
