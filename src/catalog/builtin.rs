use super::ToolTemplate;

pub const TASK_MANAGER: usize = 0;
pub const HABIT_TRACKER: usize = 1;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(super) fn task_manager() -> ToolTemplate {
    ToolTemplate {
        name: "Task Manager Pro".to_string(),
        description: "A comprehensive task management system with drag-and-drop functionality"
            .to_string(),
        features: strings(&[
            "Drag & Drop Tasks",
            "Priority Levels",
            "Due Dates",
            "Progress Tracking",
        ]),
        tech_stack: strings(&["HTML5", "CSS3", "JavaScript", "Local Storage"]),
        keywords: strings(&["task", "todo", "project"]),
        html: include_str!("../../assets/templates/task-manager/index.html").to_string(),
        css: include_str!("../../assets/templates/task-manager/styles.css").to_string(),
        js: include_str!("../../assets/templates/task-manager/app.js").to_string(),
    }
}

pub(super) fn habit_tracker() -> ToolTemplate {
    ToolTemplate {
        name: "Habit Tracker".to_string(),
        description: "A beautiful habit tracking application with streak counters and progress visualization"
            .to_string(),
        features: strings(&[
            "Daily Check-ins",
            "Streak Tracking",
            "Progress Charts",
            "Habit Categories",
        ]),
        tech_stack: strings(&["HTML5", "CSS3", "JavaScript", "Chart.js", "Local Storage"]),
        keywords: strings(&["habit", "routine", "daily"]),
        html: include_str!("../../assets/templates/habit-tracker/index.html").to_string(),
        css: include_str!("../../assets/templates/habit-tracker/styles.css").to_string(),
        js: include_str!("../../assets/templates/habit-tracker/app.js").to_string(),
    }
}
