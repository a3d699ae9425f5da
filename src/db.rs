// acex (ai code extractor)

use crate::writer::Snippet;
use chrono::Utc;
use rusqlite::{Connection, Result as SqliteResult, params};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct UploadedVideo {
    pub id: i64,
    pub title: String,
    pub video_file_path: String,
    pub uploaded_at: String,
}

#[derive(Debug, Serialize)]
pub struct CodeSegment {
    pub id: i64,
    pub code: String,
    pub start_time: f64,
    pub end_time: f64,
    pub video_id: i64,
}

pub fn get_db_path() -> std::path::PathBuf {
    if let Ok(db_path) = std::env::var("ACEX_DB_PATH") {
        return std::path::PathBuf::from(db_path);
    }
    let home_dir = dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    home_dir.join(".acex/library.db")
}

fn init_database(conn: &Connection) -> SqliteResult<()> {
    const SCHEMA_VERSION: &str = "20260826-1";

    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version TEXT PRIMARY KEY
        )",
        [],
    )?;

    let current_version: Option<String> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    // If version doesn't match, drop and recreate all tables
    if current_version.as_deref() != Some(SCHEMA_VERSION) {
        conn.execute("DROP TABLE IF EXISTS code_segments", [])?;
        conn.execute("DROP TABLE IF EXISTS uploaded_videos", [])?;
        conn.execute("DROP TABLE IF EXISTS schema_version", [])?;

        conn.execute(
            "CREATE TABLE schema_version (
                version TEXT PRIMARY KEY
            )",
            [],
        )?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [SCHEMA_VERSION],
        )?;

        conn.execute(
            "CREATE TABLE uploaded_videos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                video_file_path TEXT NOT NULL,
                uploaded_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE code_segments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL,
                start_time REAL NOT NULL,
                end_time REAL NOT NULL,
                video_id INTEGER NOT NULL
                    REFERENCES uploaded_videos(id) ON DELETE CASCADE
            )",
            [],
        )?;
    }

    Ok(())
}

pub fn connect_at(db_path: &Path) -> SqliteResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn = Connection::open(db_path)?;
    // SQLite leaves foreign keys off per connection unless asked
    conn.pragma_update(None, "foreign_keys", true)?;
    init_database(&conn)?;
    Ok(conn)
}

pub fn get_connection() -> SqliteResult<Connection> {
    connect_at(&get_db_path())
}

pub fn insert_video(conn: &Connection, title: &str, video_file_path: &str) -> SqliteResult<i64> {
    conn.execute(
        "INSERT INTO uploaded_videos (title, video_file_path, uploaded_at)
         VALUES (?1, ?2, ?3)",
        params![title, video_file_path, Utc::now().to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_video(conn: &Connection, video_id: i64) -> SqliteResult<Option<UploadedVideo>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, video_file_path, uploaded_at
         FROM uploaded_videos WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map([video_id], row_to_video)?;
    rows.next().transpose()
}

pub fn list_videos(conn: &Connection) -> SqliteResult<Vec<UploadedVideo>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, video_file_path, uploaded_at
         FROM uploaded_videos ORDER BY id",
    )?;
    let rows = stmt.query_map([], row_to_video)?;
    rows.collect()
}

/// Deletes a video; its code segments go with it via the cascade.
pub fn delete_video(conn: &Connection, video_id: i64) -> SqliteResult<usize> {
    conn.execute("DELETE FROM uploaded_videos WHERE id = ?1", [video_id])
}

/// Maps extracted snippets into code segment rows. Each snippet's timestamp
/// becomes the segment start; the end is one sampling interval later, the
/// window within which the code was on screen.
pub fn insert_segments(
    conn: &mut Connection,
    video_id: i64,
    snippets: &[Snippet],
    interval: f64,
) -> SqliteResult<usize> {
    let tx = conn.transaction()?;
    for snippet in snippets {
        tx.execute(
            "INSERT INTO code_segments (code, start_time, end_time, video_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                snippet.text,
                snippet.timestamp,
                snippet.timestamp + interval,
                video_id
            ],
        )?;
    }
    tx.commit()?;
    Ok(snippets.len())
}

pub fn list_segments(conn: &Connection, video_id: i64) -> SqliteResult<Vec<CodeSegment>> {
    let mut stmt = conn.prepare(
        "SELECT id, code, start_time, end_time, video_id
         FROM code_segments WHERE video_id = ?1 ORDER BY start_time",
    )?;
    let rows = stmt.query_map([video_id], |row| {
        Ok(CodeSegment {
            id: row.get(0)?,
            code: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            video_id: row.get(4)?,
        })
    })?;
    rows.collect()
}

fn row_to_video(row: &rusqlite::Row) -> SqliteResult<UploadedVideo> {
    Ok(UploadedVideo {
        id: row.get(0)?,
        title: row.get(1)?,
        video_file_path: row.get(2)?,
        uploaded_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_conn(temp_dir: &TempDir) -> Connection {
        connect_at(&temp_dir.path().join("library.db")).unwrap()
    }

    fn snippet(timestamp: f64, text: &str) -> Snippet {
        Snippet {
            timestamp,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_insert_and_list_videos() {
        let temp_dir = TempDir::new().unwrap();
        let conn = test_conn(&temp_dir);

        let id = insert_video(&conn, "Rust lesson 1", "/videos/lesson1.mp4").unwrap();
        assert!(id > 0);

        let videos = list_videos(&conn).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].title, "Rust lesson 1");
        assert_eq!(videos[0].video_file_path, "/videos/lesson1.mp4");
        assert!(!videos[0].uploaded_at.is_empty());
    }

    #[test]
    fn test_get_video_missing_id() {
        let temp_dir = TempDir::new().unwrap();
        let conn = test_conn(&temp_dir);
        assert!(get_video(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn test_segments_map_interval_window() {
        let temp_dir = TempDir::new().unwrap();
        let mut conn = test_conn(&temp_dir);

        let id = insert_video(&conn, "lesson", "/videos/lesson.mp4").unwrap();
        let snippets = vec![snippet(1.5, "print(1)"), snippet(3.25, "x = 2")];
        let inserted = insert_segments(&mut conn, id, &snippets, 2.0).unwrap();
        assert_eq!(inserted, 2);

        let segments = list_segments(&conn, id).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].code, "print(1)");
        assert_eq!(segments[0].start_time, 1.5);
        assert_eq!(segments[0].end_time, 3.5);
        assert_eq!(segments[1].start_time, 3.25);
        assert_eq!(segments[1].video_id, id);
    }

    #[test]
    fn test_segments_require_existing_video() {
        let temp_dir = TempDir::new().unwrap();
        let mut conn = test_conn(&temp_dir);

        let result = insert_segments(&mut conn, 999, &[snippet(0.0, "x = 1")], 2.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_video_cascades_to_segments() {
        let temp_dir = TempDir::new().unwrap();
        let mut conn = test_conn(&temp_dir);

        let id = insert_video(&conn, "lesson", "/videos/lesson.mp4").unwrap();
        insert_segments(&mut conn, id, &[snippet(0.0, "x = 1")], 2.0).unwrap();

        let deleted = delete_video(&conn, id).unwrap();
        assert_eq!(deleted, 1);
        assert!(list_segments(&conn, id).unwrap().is_empty());
    }

    #[test]
    fn test_schema_survives_reconnect() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("library.db");

        let conn = connect_at(&db_path).unwrap();
        let id = insert_video(&conn, "lesson", "/videos/lesson.mp4").unwrap();
        drop(conn);

        let conn = connect_at(&db_path).unwrap();
        assert!(get_video(&conn, id).unwrap().is_some());
    }
}
