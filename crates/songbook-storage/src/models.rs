use crate::schema::songs;

use diesel::prelude::*;
use songbook_core::domain::{Song, SongId};

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = songs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SongRow {
  pub id: i64,
  pub group_name: String,
  pub song: String,
  pub release_date: String,
  pub link: String,
  pub text: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = songs)]
pub struct NewSongRow<'a> {
  pub group_name: &'a str,
  pub song: &'a str,
}

/// Full overwrite of the mutable columns; empty strings are written as-is.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = songs)]
pub struct SongChangeset<'a> {
  pub release_date: &'a str,
  pub link: &'a str,
  pub text: &'a str,
}

impl From<SongRow> for Song {
  fn from(row: SongRow) -> Self {
    Song {
      id: SongId::from_i64(row.id),
      group: row.group_name,
      song: row.song,
      release_date: row.release_date,
      link: row.link,
      text: row.text,
    }
  }
}
