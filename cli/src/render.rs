//! Plain-text rendering of store state.

use std::fmt::Write;

use taskboard_core::{Category, Pagination, Todo};

pub fn todo_line(todo: &Todo) -> String {
    let mark = if todo.completed { "x" } else { " " };
    let mut line = format!(
        "{:>5}  [{mark}]  {:<6}  {}",
        todo.id, todo.priority, todo.title
    );
    if let Some(due) = todo.due_date {
        let _ = write!(line, "  (due {})", due.format("%Y-%m-%d"));
    }
    if let Some(category) = &todo.category {
        let _ = write!(line, "  #{}", category.name);
    }
    line
}

pub fn todo_list(todos: &[Todo], pagination: &Pagination) -> String {
    let mut out = String::new();
    if todos.is_empty() {
        out.push_str("no todos\n");
    }
    for todo in todos {
        out.push_str(&todo_line(todo));
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "page {} of {} ({} todos)",
        pagination.current_page,
        pagination.total_pages.max(1),
        pagination.total
    );
    out
}

pub fn todo_detail(todo: &Todo) -> String {
    let mut out = todo_line(todo);
    out.push('\n');
    if !todo.description.is_empty() {
        let _ = writeln!(out, "\n{}\n", todo.description);
    }
    if let (Some(id), None) = (todo.category_id, &todo.category) {
        let _ = writeln!(out, "category: {id} (deleted)");
    }
    let _ = writeln!(out, "created: {}", todo.created_at.to_rfc3339());
    let _ = writeln!(out, "updated: {}", todo.updated_at.to_rfc3339());
    out
}

pub fn category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "no categories\n".to_string();
    }
    categories
        .iter()
        .map(|c| format!("{:>5}  {:<8}  {}\n", c.id, c.color, c.name))
        .collect()
}
