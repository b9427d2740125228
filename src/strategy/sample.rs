use super::records::{Initiative, Milestone, Operation, Portfolio, Task};

const STATUSES: [&str; 5] = ["planned", "active", "at-risk", "blocked", "completed"];
const PRIORITIES: [&str; 3] = ["low", "medium", "high"];
const ASSIGNEES: [&str; 6] = ["amara", "bo", "chidi", "dana", "eun", "farid"];
const THEMES: [&str; 8] = [
    "Platform reliability",
    "Market expansion",
    "Customer onboarding",
    "Cost efficiency",
    "Data foundations",
    "Partner ecosystem",
    "Security posture",
    "Talent development",
];

/// Deterministic pseudo-random value in `0..1` for a seed.
fn rand_simple(seed: usize) -> f64 {
    let x = (seed.wrapping_add(1).wrapping_mul(9301).wrapping_add(49297)) % 233_280;
    x as f64 / 233_280.0
}

fn pick<'a>(options: &[&'a str], seed: usize) -> &'a str {
    options[(rand_simple(seed) * options.len() as f64) as usize % options.len()]
}

/// Demo portfolio with `2 * scale` initiatives, two milestones each,
/// `3 * scale` operations and `8 * scale` tasks. The same scale always
/// yields the same records.
pub fn sample_portfolio(scale: usize) -> Portfolio {
    let initiative_count = scale * 2;
    let operation_count = scale * 3;
    let task_count = scale * 8;

    let initiatives = (0..initiative_count)
        .map(|index| Initiative {
            id: format!("ini-{index}"),
            title: format!("{} {}", THEMES[index % THEMES.len()], index / THEMES.len() + 1),
            description: Some(format!(
                "Strategic goal #{index} for the {} portfolio.",
                THEMES[index % THEMES.len()].to_ascii_lowercase()
            )),
            status: Some(pick(&STATUSES, index * 7).to_owned()),
            priority: Some(pick(&PRIORITIES, index * 11).to_owned()),
            progress: Some((rand_simple(index * 13) * 100.0).round() as f32),
            due_date: Some(format!("2027-{:02}-15", index % 12 + 1)),
            assignee: Some(pick(&ASSIGNEES, index * 17).to_owned()),
        })
        .collect::<Vec<_>>();

    let milestones = (0..initiative_count)
        .flat_map(|initiative| {
            (0..2).map(move |step| Milestone {
                id: format!("ms-{initiative}-{step}"),
                title: format!("Checkpoint {} for initiative {initiative}", step + 1),
                initiative_id: format!("ini-{initiative}"),
                description: None,
                status: Some(pick(&STATUSES, initiative * 5 + step).to_owned()),
                progress: None,
                due_date: Some(format!("2027-{:02}-01", (initiative + step * 3) % 12 + 1)),
            })
        })
        .collect::<Vec<_>>();

    let operations = (0..operation_count)
        .map(|index| {
            let primary = (rand_simple(index * 3) * initiative_count as f64) as usize;
            let primary = primary.min(initiative_count.saturating_sub(1));
            let mut initiative_ids = vec![format!("ini-{primary}")];
            if index % 3 == 0 && initiative_count > 1 {
                initiative_ids.push(format!("ini-{}", (primary + 1) % initiative_count));
            }

            Operation {
                id: format!("op-{index}"),
                title: format!("Operation {index}"),
                description: None,
                status: Some(pick(&STATUSES, index * 19).to_owned()),
                priority: Some(pick(&PRIORITIES, index * 23).to_owned()),
                progress: Some((rand_simple(index * 29) * 100.0).round() as f32),
                due_date: None,
                assignee: Some(pick(&ASSIGNEES, index * 31).to_owned()),
                initiative_ids,
            }
        })
        .collect::<Vec<_>>();

    let tasks = (0..task_count)
        .map(|index| {
            let roll = rand_simple(index * 37);
            let strategic_item_id = if roll < 0.6 && operation_count > 0 {
                Some(format!("op-{}", index % operation_count))
            } else if roll < 0.85 && initiative_count > 0 {
                Some(format!("ini-{}", index % initiative_count))
            } else {
                None
            };

            Task {
                id: format!("task-{index}"),
                title: format!("Task {index}"),
                description: None,
                status: Some(pick(&STATUSES, index * 41).to_owned()),
                priority: Some(pick(&PRIORITIES, index * 43).to_owned()),
                progress: None,
                due_date: None,
                assignee: Some(pick(&ASSIGNEES, index * 47).to_owned()),
                strategic_item_id,
            }
        })
        .collect::<Vec<_>>();

    Portfolio {
        initiatives,
        operations,
        milestones,
        tasks,
    }
}
