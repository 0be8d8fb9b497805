//! [`Enrollment`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{user, Enrollment},
    infra::{
        database::{self, postgres::Connection as _, Postgres},
        Database,
    },
};

impl Database<Select<By<Vec<Enrollment>, user::Id>>> for Postgres {
    type Ok = Vec<Enrollment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Enrollment>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let parent_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, parent_id, student_name, student_age, parent_name, \
                   email, phone, skill_level, program, medical_notes, \
                   created_at \
            FROM enrollments \
            WHERE parent_id = $1::UUID \
            ORDER BY created_at DESC, id";
        let rows = self
            .query(SQL, &[&parent_id])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(rows
            .iter()
            .map(|row| Enrollment {
                id: row.get("id"),
                parent_id: row.get("parent_id"),
                student_name: row.get("student_name"),
                // Bounded by the `enrollments_student_age_check`.
                student_age: u8::try_from(row.get::<_, i16>("student_age"))
                    .unwrap_or_default(),
                parent_name: row.get("parent_name"),
                email: row.get("email"),
                phone: row.get("phone"),
                skill_level: row.get("skill_level"),
                program: row.get("program"),
                medical_notes: row.get("medical_notes"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

impl Database<Insert<Enrollment>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(enrollment): Insert<Enrollment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Enrollment {
            id,
            parent_id,
            student_name,
            student_age,
            parent_name,
            email,
            phone,
            skill_level,
            program,
            medical_notes,
            created_at,
        } = enrollment;

        const SQL: &str = "\
            INSERT INTO enrollments (\
                id, parent_id, student_name, student_age, parent_name, \
                email, phone, skill_level, program, medical_notes, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::INT2, $5::VARCHAR, \
                $6::VARCHAR, $7::VARCHAR, $8::INT2, $9::INT2, $10::VARCHAR, \
                $11::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &parent_id,
                &student_name,
                &i16::from(student_age),
                &parent_name,
                &email,
                &phone,
                &skill_level,
                &program,
                &medical_notes,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
