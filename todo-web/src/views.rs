use todo_core::{Filter, Stats, Tag, Task};

pub struct IndexPage<'a> {
    pub tasks: &'a [Task],
    pub filter: Filter,
    pub tag: Option<Tag>,
    pub stats: Stats,
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Link back to the index with the given filter and optional tag filter.
pub fn index_url(filter: Filter, tag: Option<Tag>) -> String {
    match tag {
        Some(tag) => format!("/?filter={}&tag={}", filter.as_str(), tag),
        None => format!("/?filter={}", filter.as_str()),
    }
}

fn hidden_view_fields(filter: Filter, tag: Option<Tag>) -> String {
    let tag = tag.map(|t| t.as_str()).unwrap_or_default();
    format!(
        r#"<input type="hidden" name="current_filter" value="{}"><input type="hidden" name="tag_filter" value="{tag}">"#,
        filter.as_str()
    )
}

fn render_filter_bar(current: Filter, tag: Option<Tag>) -> String {
    Filter::ALL
        .iter()
        .map(|filter| {
            let class = if *filter == current { "filter-btn active" } else { "filter-btn" };
            format!(
                r#"<a class="{class}" href="{}">{}</a>"#,
                index_url(*filter, tag),
                filter.as_str()
            )
        })
        .collect()
}

fn render_tag_bar(filter: Filter, current: Option<Tag>) -> String {
    let mut bar = format!(r#"<a class="tag-filter" href="{}">any tag</a>"#, index_url(filter, None));
    for tag in Tag::ALL {
        let class = if current == Some(tag) { "tag-filter active" } else { "tag-filter" };
        bar.push_str(&format!(
            r#"<a class="{class}" href="{}">#{tag}</a>"#,
            index_url(filter, Some(tag))
        ));
    }
    bar
}

fn render_task(task: &Task, filter: Filter, tag: Option<Tag>) -> String {
    let id = task.id;
    let text = html_escape(&task.text);
    let hidden = hidden_view_fields(filter, tag);

    let mut classes = vec!["task-item"];
    if task.completed {
        classes.push("completed");
    }
    if task.pinned {
        classes.push("pinned");
        classes.push("no-drag");
    }

    let tags: String = task
        .tags
        .iter()
        .map(|name| {
            let name = html_escape(name);
            format!(
                r#"<span class="tag">#{name}<button type="button" class="tag-remove" data-tag-name="{name}" title="Remove tag">x</button></span>"#
            )
        })
        .collect();

    let tag_options: String = Tag::ALL
        .iter()
        .filter(|t| !task.tags.iter().any(|name| name == t.as_str()))
        .map(|t| format!(r#"<option value="{t}">{t}</option>"#))
        .collect();

    let due_value = task
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let due = if due_value.is_empty() {
        String::new()
    } else {
        format!(r#"<small class="due-date">due {due_value}</small>"#)
    };

    let check = if task.completed { "&#x2611;" } else { "&#x2610;" };
    let pin_label = if task.pinned { "Unpin" } else { "Pin" };

    format!(
        r##"<li class="{classes}" data-task-id="{id}" data-tags-url="/api/tags/{id}" draggable="{draggable}" style="border-left-color: {color}">
            <form method="post" action="/toggle/{id}">{hidden}<button class="toggle-btn" title="Toggle done">{check}</button></form>
            <span class="task-text">{text}</span>
            <span class="task-tags">{tags}</span>
            {due}
            <div class="task-actions">
                <form method="post" action="/pin/{id}">{hidden}<button>{pin_label}</button></form>
                <form method="post" action="/edit/{id}">{hidden}<input name="new_task_text" value="{text}"><button>Save</button></form>
                <form method="post" action="/color/{id}">{hidden}<input type="color" name="color" value="{color}"><button>Color</button></form>
                <form method="post" action="/delete/{id}">{hidden}<button class="delete-btn">Delete</button></form>
                <form class="due-date-form" method="post" action="/set-duedate/{id}"><input type="date" name="due_date" value="{due_value}"><button>Set due date</button></form>
                <form class="tag-add-form"><select name="tag_name"><option value="">Add tag...</option>{tag_options}</select><button>Tag</button></form>
                <button type="button" class="details-btn" data-details-url="/api/task-details/{id}">Details</button>
            </div>
        </li>"##,
        classes = classes.join(" "),
        color = html_escape(&task.color),
        draggable = !task.pinned,
    )
}

/// Drag-and-drop reordering, tag editing, due dates and the details panel.
const INDEX_SCRIPT: &str = r#"
document.addEventListener('DOMContentLoaded', () => {
    const list = document.getElementById('task-list');
    let dragged = null;

    list.addEventListener('dragstart', (event) => {
        const item = event.target.closest('.task-item');
        if (!item || item.classList.contains('no-drag')) {
            event.preventDefault();
            return;
        }
        dragged = item;
    });

    list.addEventListener('dragover', (event) => {
        const target = event.target.closest('.task-item');
        if (!dragged || !target || target === dragged || target.classList.contains('no-drag')) {
            return;
        }
        event.preventDefault();
        const rect = target.getBoundingClientRect();
        const after = event.clientY > rect.top + rect.height / 2;
        list.insertBefore(dragged, after ? target.nextSibling : target);
    });

    list.addEventListener('drop', (event) => event.preventDefault());

    list.addEventListener('dragend', async () => {
        if (!dragged) {
            return;
        }
        dragged = null;
        const taskIds = Array.from(list.querySelectorAll('.task-item')).map((item) => item.dataset.taskId);
        const response = await fetch('/api/reorder', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ task_ids: taskIds }),
        });
        if (!response.ok) {
            alert('Failed to save new task order. Please reload.');
        }
    });

    async function sendTag(item, method, tagName) {
        const response = await fetch(item.dataset.tagsUrl, {
            method,
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ tag_name: tagName }),
        });
        if (response.ok) {
            window.location.reload();
        } else {
            const error = await response.json();
            alert(`Tag update failed: ${error.message}`);
        }
    }

    list.querySelectorAll('.tag-add-form').forEach((form) => {
        form.addEventListener('submit', (event) => {
            event.preventDefault();
            const tagName = form.elements.tag_name.value;
            if (tagName) {
                sendTag(form.closest('.task-item'), 'POST', tagName);
            }
        });
    });

    list.querySelectorAll('.tag-remove').forEach((button) => {
        button.addEventListener('click', () => {
            sendTag(button.closest('.task-item'), 'DELETE', button.dataset.tagName);
        });
    });

    list.querySelectorAll('.due-date-form').forEach((form) => {
        form.addEventListener('submit', async (event) => {
            event.preventDefault();
            const response = await fetch(form.action, {
                method: 'POST',
                body: new URLSearchParams(new FormData(form)),
            });
            if (response.ok) {
                window.location.reload();
            } else {
                const error = await response.json();
                alert(`Could not save due date: ${error.message}`);
            }
        });
    });

    const panel = document.getElementById('details-panel');
    const show = (id, value) => {
        document.getElementById(id).textContent = value || '';
    };

    list.querySelectorAll('.details-btn').forEach((button) => {
        button.addEventListener('click', async () => {
            const response = await fetch(button.dataset.detailsUrl);
            if (!response.ok) {
                alert('Could not load task details.');
                return;
            }
            const task = await response.json();
            show('details-text', task.text);
            show('details-created', task.created_at_display);
            show('details-updated', task.updated_at_display);
            show('details-due', task.due_date);
            show('details-remaining', task.time_remaining);
            show('details-warning', task.warning_message);
            show('details-tags', task.tags.map((tag) => `#${tag}`).join(' '));
            panel.hidden = false;
        });
    });

    document.getElementById('details-close').addEventListener('click', () => {
        panel.hidden = true;
    });
});
"#;

pub fn render_index(page: &IndexPage<'_>) -> String {
    let IndexPage { tasks, filter, tag, stats } = *page;

    let items: String = if tasks.is_empty() {
        r#"<li class="empty-state">No tasks here yet.</li>"#.to_string()
    } else {
        tasks.iter().map(|task| render_task(task, filter, tag)).collect()
    };

    let percentage = stats.completion_percentage();
    let filter_bar = render_filter_bar(filter, tag);
    let tag_bar = render_tag_bar(filter, tag);
    let hidden = hidden_view_fields(filter, tag);
    let add_action = index_url(filter, tag);

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>To-Do List</title>
    <style>
        body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
        .task-item {{ border-left: 6px solid; padding: .5rem; margin: .25rem 0; list-style: none; }}
        .task-item.completed .task-text {{ text-decoration: line-through; opacity: .6; }}
        .task-item.pinned {{ background: #fff8dc; }}
        .task-actions form, .task-item > form {{ display: inline; }}
        .filter-btn.active, .tag-filter.active {{ font-weight: bold; }}
        .progress {{ background: #eee; height: .5rem; }}
        .progress > div {{ background: #4caf50; height: 100%; }}
    </style>
</head>
<body>
    <h1>To-Do List</h1>
    <section class="progress-section">
        <p>{completed} of {total} tasks completed ({percentage}%)</p>
        <div class="progress"><div style="width: {percentage}%"></div></div>
    </section>
    <form class="add-task-form" method="post" action="{add_action}">
        <input name="task" placeholder="Add a new task" autocomplete="off">
        <button>Add</button>
    </form>
    <nav class="filters">{filter_bar}</nav>
    <nav class="tags">{tag_bar}</nav>
    <ul id="task-list" class="task-list">
        {items}
    </ul>
    <form method="post" action="/clear-completed">{hidden}<button>Clear completed</button></form>
    <aside id="details-panel" hidden>
        <h2 id="details-text"></h2>
        <p>Created: <span id="details-created"></span></p>
        <p>Updated: <span id="details-updated"></span></p>
        <p>Due: <span id="details-due"></span></p>
        <p id="details-remaining"></p>
        <p id="details-warning"></p>
        <p>Tags: <span id="details-tags"></span></p>
        <button type="button" id="details-close">Close</button>
    </aside>
    <script>{script}</script>
</body>
</html>"##,
        completed = stats.completed,
        total = stats.total,
        script = INDEX_SCRIPT,
    )
}
