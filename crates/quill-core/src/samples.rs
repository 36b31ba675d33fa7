//! Sample notes written into a fresh store

use chrono::{DateTime, Duration, Utc};

use crate::models::{make_preview, Note, NoteId};

/// The four notes shown on first launch
pub fn sample_notes(now: DateTime<Utc>) -> Vec<Note> {
    let entries: [(i64, &str, &str, &str, i64); 4] = [
        (
            1,
            "Welcome to Notes",
            "Welcome to this note-taking app!\n\nEvery screen is built by a small element builder that turns markup descriptions straight into document nodes, with no virtual tree in between.\n\nKey features:\n- Element builder\n- Client-side routing\n- Component functions\n- Toast notifications\n- Persistent note storage\n\nFeel free to explore and edit this note!",
            "bg-blue-50 dark:bg-blue-950/30",
            0,
        ),
        (
            2,
            "Meeting Notes",
            "Meeting Notes - Q1 Planning\n\nAttendees: Team leads, Product managers\n\nAgenda:\n1. Review Q4 accomplishments\n2. Set Q1 goals and objectives\n3. Discuss resource allocation\n4. Timeline for key deliverables\n\nAction Items:\n- Finalize project scope by end of week\n- Schedule follow-up meetings\n\nNext meeting: January 15th",
            "bg-purple-50 dark:bg-purple-950/30",
            1,
        ),
        (
            3,
            "Ideas",
            "Ideas for the Note-Taking App\n\n1. Add markdown support\n2. Implement tags/categories\n3. Export notes as markdown files\n4. Full-text search\n5. Keyboard shortcuts for power users",
            "bg-green-50 dark:bg-green-950/30",
            2,
        ),
        (
            4,
            "Shopping List",
            "Shopping List\n\nDairy:\n- 2x Milk (whole)\n- Eggs (dozen)\n\nBakery:\n- Whole wheat bread\n\nBeverages:\n- Coffee beans (dark roast)\n- Green tea\n\nProduce:\n- Spinach\n- Tomatoes",
            "bg-amber-50 dark:bg-amber-950/30",
            7,
        ),
    ];

    entries
        .into_iter()
        .map(|(id, title, content, color, days_ago)| {
            let at = now - Duration::days(days_ago);
            Note {
                id: NoteId(id),
                title: title.to_string(),
                content: content.to_string(),
                preview: make_preview(content),
                color: color.to_string(),
                created_at: at,
                updated_at: at,
            }
        })
        .collect()
}
