//! # PlantUML Diagram
//!
//! Renders a [`TableCollection`] as a PlantUML class diagram: one class per
//! table with its engine, configuration, columns and keys, and an arrow for
//! every dependency between two tables of the collection.

use handlebars::{no_escape, Handlebars, RenderError};
use serde::Serialize;
use serde_json::json;

use crate::framework::schema::{EngineConfig, KeyKind, Table, TableCollection};

// No tag may sit alone on a line, handlebars would strip the line break
static DIAGRAM_TEMPLATE: &str = r#"@startuml
' This diagram is generated with https://github.com/Felixoid/clickhouse-plantuml{{#each macros}}
!define {{name}}(x) class x << ({{letter}},{{color}}) >>{{/each}}

hide empty methods
hide stereotypes
skinparam classarrowcolor gray

{{#each tables}}{{macro_name}}({{name}}) {
{{#each lines}}  {{this}}
{{/each}}}

{{/each}}{{#each edges}}{{this}}
{{/each}}@enduml
"#;

#[derive(Debug, Serialize)]
struct ClassMacro {
    name: &'static str,
    letter: &'static str,
    color: &'static str,
}

const MACROS: [ClassMacro; 4] = [
    ClassMacro {
        name: "Table",
        letter: "T",
        color: "mistyrose",
    },
    ClassMacro {
        name: "View",
        letter: "V",
        color: "lightblue",
    },
    ClassMacro {
        name: "MaterializedView",
        letter: "m",
        color: "orange",
    },
    ClassMacro {
        name: "Distributed",
        letter: "D",
        color: "violet",
    },
];

#[derive(Debug, Serialize)]
struct TableClass {
    macro_name: &'static str,
    name: String,
    lines: Vec<String>,
}

/// Class macro used for a table engine
pub fn table_macro(engine: &str) -> &'static str {
    match engine {
        "MaterializedView" => "MaterializedView",
        "View" => "View",
        "Distributed" => "Distributed",
        _ => "Table",
    }
}

/// Keys shown for a table. The primary key only when it differs from the
/// sorting key.
fn table_keys(table: &Table) -> Vec<KeyKind> {
    KeyKind::ALL
        .into_iter()
        .filter(|kind| *kind != KeyKind::Primary || table.sorting_key != table.primary_key)
        .collect()
}

fn push_multiline(lines: &mut Vec<String>, text: &str) {
    lines.extend(text.lines().map(str::to_string));
}

fn push_config(lines: &mut Vec<String>, title: &str, config: &EngineConfig) {
    if config.is_empty() {
        return;
    }
    lines.push(format!("..{title}.."));
    for (name, value) in config.iter() {
        push_multiline(lines, &format!("{name}: {value}"));
    }
}

fn table_lines(table: &Table) -> Vec<String> {
    let mut lines = vec![format!("ENGINE=**{}**", table.engine)];
    push_config(&mut lines, "engine config", &table.engine_config);
    push_config(&mut lines, "replication", &table.replication_config);

    let keys = table_keys(table);
    lines.push("==columns==".to_string());
    for column in &table.columns {
        let signs: String = keys
            .iter()
            .filter(|kind| column.is_in_key(**kind))
            .map(|kind| format!(" {}", kind.sign()))
            .collect();
        lines.push(format!("{}: {}{}", column.name, column.column_type, signs));
    }

    for kind in keys {
        let key = table.key(kind);
        if !key.is_empty() {
            lines.push(format!("..{}{} key..", kind.sign(), kind.name()));
            push_multiline(&mut lines, key);
        }
    }
    lines
}

fn edges(tables: &TableCollection) -> Vec<String> {
    let mut edges = Vec::new();
    for table in tables {
        let name = table.qualified_name();
        edges.extend(
            table
                .dependencies
                .iter()
                .filter(|d| tables.contains(d))
                .map(|d| format!("{name} -|> {d}")),
        );
        edges.extend(
            table
                .rev_dependencies
                .iter()
                .filter(|r| tables.contains(r))
                .map(|r| format!("{r} -|> {name}")),
        );
    }
    edges
}

/// Renders the PlantUML source of the diagram
pub fn render_diagram(tables: &TableCollection) -> Result<String, RenderError> {
    let mut reg = Handlebars::new();
    reg.register_escape_fn(no_escape);

    let classes: Vec<TableClass> = tables
        .iter()
        .map(|table| TableClass {
            macro_name: table_macro(&table.engine),
            name: table.qualified_name(),
            lines: table_lines(table),
        })
        .collect();

    let context = json!({
        "macros": MACROS,
        "tables": classes,
        "edges": edges(tables),
    });

    reg.render_template(DIAGRAM_TEMPLATE, &context)
}
