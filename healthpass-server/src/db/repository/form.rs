//! Health declaration form Repository

use super::RepoResult;
use crate::db::pagination::{ListQuery, Page, paginate};
use shared::models::{Form, FormCreate, FormSearch};
use sqlx::SqliteConnection;

const COLUMNS: &str = "id, name, sex, phone, id_card, org_name, car_id, reason, guarantor, \
                       guarantor_phone, health_code_status, is_been_epidemic_area_in_two_weeks, \
                       is_cough, in_time_applied, out_time_applied, in_time_real, out_time_real";

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Form>> {
    let form = sqlx::query_as::<_, Form>(&format!("SELECT {COLUMNS} FROM forms WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(form)
}

pub async fn create(conn: &mut SqliteConnection, data: &FormCreate) -> RepoResult<Form> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO forms (name, sex, phone, id_card, org_name, car_id, reason, guarantor, guarantor_phone, \
         health_code_status, is_been_epidemic_area_in_two_weeks, is_cough, \
         in_time_applied, out_time_applied, in_time_real, out_time_real) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(data.sex.code())
    .bind(&data.phone)
    .bind(&data.id_card)
    .bind(&data.org_name)
    .bind(&data.car_id)
    .bind(&data.reason)
    .bind(&data.guarantor)
    .bind(&data.guarantor_phone)
    .bind(data.health_code_status.code())
    .bind(data.is_been_epidemic_area_in_two_weeks)
    .bind(data.is_cough)
    .bind(data.in_time_applied)
    .bind(data.out_time_applied)
    .bind(data.in_time_real)
    .bind(data.out_time_real)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Form {
        id,
        name: data.name.clone(),
        sex: data.sex.code(),
        phone: data.phone.clone(),
        id_card: data.id_card.clone(),
        org_name: data.org_name.clone(),
        car_id: data.car_id.clone(),
        reason: data.reason.clone(),
        guarantor: data.guarantor.clone(),
        guarantor_phone: data.guarantor_phone.clone(),
        health_code_status: data.health_code_status.code(),
        is_been_epidemic_area_in_two_weeks: data.is_been_epidemic_area_in_two_weeks,
        is_cough: data.is_cough,
        in_time_applied: data.in_time_applied,
        out_time_applied: data.out_time_applied,
        in_time_real: data.in_time_real,
        out_time_real: data.out_time_real,
    })
}

pub fn search_query(search: &FormSearch) -> ListQuery {
    let mut query = ListQuery::new(COLUMNS, "forms")
        .filter_eq("name", search.name.clone())
        .filter_eq("sex", search.sex.map(|s| s.code()))
        .filter_eq("health_code_status", search.health_code_status.map(|s| s.code()))
        .filter_eq(
            "is_been_epidemic_area_in_two_weeks",
            search.is_been_epidemic_area_in_two_weeks,
        )
        .filter_eq("is_cough", search.is_cough);
    if let Some(in_time) = search.in_time {
        query = query.filter("in_time_real > ?", [in_time]);
    }
    if let Some(out_time) = search.out_time {
        query = query.filter("out_time_real < ?", [out_time]);
    }
    query.order_by("id DESC")
}

/// Newest first
pub async fn search(
    conn: &mut SqliteConnection,
    search: &FormSearch,
    page_id: i64,
    page_size: i64,
) -> RepoResult<Page<Form>> {
    paginate(conn, &search_query(search), page_id, page_size).await
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM forms WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
