use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::course::{Course, CourseDraft, CourseRole, Enrollment};
use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::group::{Group, GroupDraft};
use crate::domain::material::{Material, MaterialDraft};
use crate::domain::repositories::{
    CourseRepository, EnrollmentRepository, GroupRepository, MaterialRepository, UserRepository,
};
use crate::domain::user::{Email, NewUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    courses: BTreeMap<i64, Course>,
    /// (course_id, user_id) -> role
    enrollments: BTreeMap<(i64, i64), CourseRole>,
    groups: BTreeMap<i64, Group>,
    /// (group_id, user_id)
    group_members: BTreeSet<(i64, i64)>,
    materials: BTreeMap<i64, Material>,
    last_ids: LastIds,
}

/// Highest id handed out per table, never lowered by deletes
#[derive(Debug, Default)]
struct LastIds {
    users: i64,
    courses: i64,
    groups: i64,
    materials: i64,
}

impl Tables {
    fn next_id(last: &mut i64) -> i64 {
        *last += 1;
        *last
    }

    fn enrollment(&self, course_id: i64, user_id: i64, role: CourseRole) -> Option<Enrollment> {
        self.users.get(&user_id).map(|user| Enrollment {
            user_id,
            course_id,
            role,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.to_string(),
            student_number: user.student_number.clone(),
            semester: user.semester,
            subject: user.subject.clone(),
        })
    }
}

/// In-memory implementation of every repository
///
/// Intended for tests and local runs. Each instance is fully isolated, so
/// tests build their own store instead of sharing a database.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Database("lock poisoned".to_string()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::Database("lock poisoned".to_string()))
    }

    /// Inserts or replaces a user under its own id
    pub fn put_user(&self, user: User) -> RepositoryResult<()> {
        let mut tables = self.write()?;
        tables.last_ids.users = tables.last_ids.users.max(user.id);
        tables.users.insert(user.id, user);
        Ok(())
    }

    /// Inserts or replaces a course under its own id
    pub fn put_course(&self, course: Course) -> RepositoryResult<()> {
        let mut tables = self.write()?;
        tables.last_ids.courses = tables.last_ids.courses.max(course.id);
        tables.courses.insert(course.id, course);
        Ok(())
    }

    /// Inserts or replaces a group under its own id
    pub fn put_group(&self, group: Group) -> RepositoryResult<()> {
        let mut tables = self.write()?;
        tables.last_ids.groups = tables.last_ids.groups.max(group.id);
        tables.groups.insert(group.id, group);
        Ok(())
    }

    /// Inserts or replaces a material under its own id
    pub fn put_material(&self, material: Material) -> RepositoryResult<()> {
        let mut tables = self.write()?;
        tables.last_ids.materials = tables.last_ids.materials.max(material.id);
        tables.materials.insert(material.id, material);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let mut tables = self.write()?;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }

        let created = User {
            id: Tables::next_id(&mut tables.last_ids.users),
            first_name: user.profile.first_name,
            last_name: user.profile.last_name,
            email: user.email,
            student_number: user.profile.student_number,
            semester: user.profile.semester,
            subject: user.profile.subject,
            language: user.profile.language,
            root: user.root,
            encrypted_password: user.encrypted_password,
            confirm_email_token: user.confirm_email_token,
        };
        tables.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn update(&self, user: &User) -> RepositoryResult<()> {
        let mut tables = self.write()?;

        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(RepositoryError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }

        match tables.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("User {}", user.id))),
        }
    }
}

#[async_trait]
impl CourseRepository for InMemoryStore {
    async fn create(&self, draft: CourseDraft) -> RepositoryResult<Course> {
        let mut tables = self.write()?;
        let course = Course {
            id: Tables::next_id(&mut tables.last_ids.courses),
            name: draft.name,
            description: draft.description,
            begins_at: draft.begins_at,
            ends_at: draft.ends_at,
            required_percentage: draft.required_percentage,
        };
        tables.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Course>> {
        Ok(self.read()?.courses.get(&id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Course>> {
        Ok(self.read()?.courses.values().cloned().collect())
    }

    async fn update(&self, course: &Course) -> RepositoryResult<()> {
        match self.write()?.courses.get_mut(&course.id) {
            Some(stored) => {
                *stored = course.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("Course {}", course.id))),
        }
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut tables = self.write()?;

        if tables.courses.remove(&id).is_none() {
            return Err(RepositoryError::NotFound(format!("Course {}", id)));
        }

        tables.enrollments.retain(|(course_id, _), _| *course_id != id);
        let removed_groups: BTreeSet<i64> = tables
            .groups
            .values()
            .filter(|g| g.course_id == id)
            .map(|g| g.id)
            .collect();
        tables.groups.retain(|_, g| g.course_id != id);
        tables
            .group_members
            .retain(|(group_id, _)| !removed_groups.contains(group_id));
        tables.materials.retain(|_, m| m.course_id != id);

        Ok(())
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryStore {
    async fn find(&self, user_id: i64, course_id: i64) -> RepositoryResult<Option<Enrollment>> {
        let tables = self.read()?;
        Ok(tables
            .enrollments
            .get(&(course_id, user_id))
            .and_then(|role| tables.enrollment(course_id, user_id, *role)))
    }

    async fn list(&self, course_id: i64, roles: &[CourseRole]) -> RepositoryResult<Vec<Enrollment>> {
        let tables = self.read()?;
        Ok(tables
            .enrollments
            .range((course_id, i64::MIN)..=(course_id, i64::MAX))
            .filter(|(_, role)| roles.is_empty() || roles.contains(role))
            .filter_map(|((course_id, user_id), role)| {
                tables.enrollment(*course_id, *user_id, *role)
            })
            .collect())
    }

    async fn list_for_user(&self, user_id: i64) -> RepositoryResult<Vec<Enrollment>> {
        let tables = self.read()?;
        Ok(tables
            .enrollments
            .iter()
            .filter(|((_, uid), _)| *uid == user_id)
            .filter_map(|((course_id, uid), role)| tables.enrollment(*course_id, *uid, *role))
            .collect())
    }

    async fn enroll(&self, user_id: i64, course_id: i64, role: CourseRole) -> RepositoryResult<()> {
        let mut tables = self.write()?;

        if !tables.users.contains_key(&user_id) {
            return Err(RepositoryError::NotFound(format!("User {}", user_id)));
        }
        if !tables.courses.contains_key(&course_id) {
            return Err(RepositoryError::NotFound(format!("Course {}", course_id)));
        }
        if tables.enrollments.contains_key(&(course_id, user_id)) {
            return Err(RepositoryError::Conflict(format!(
                "user {} is already enrolled in course {}",
                user_id, course_id
            )));
        }

        tables.enrollments.insert((course_id, user_id), role);
        Ok(())
    }

    async fn disenroll(&self, user_id: i64, course_id: i64) -> RepositoryResult<()> {
        let mut tables = self.write()?;

        if tables.enrollments.remove(&(course_id, user_id)).is_none() {
            return Err(RepositoryError::NotFound(format!(
                "Enrollment of user {} in course {}",
                user_id, course_id
            )));
        }

        let course_groups: BTreeSet<i64> = tables
            .groups
            .values()
            .filter(|g| g.course_id == course_id)
            .map(|g| g.id)
            .collect();
        tables
            .group_members
            .retain(|(group_id, uid)| !(*uid == user_id && course_groups.contains(group_id)));

        Ok(())
    }

    async fn change_role(&self, user_id: i64, course_id: i64, role: CourseRole) -> RepositoryResult<()> {
        match self.write()?.enrollments.get_mut(&(course_id, user_id)) {
            Some(stored) => {
                *stored = role;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!(
                "Enrollment of user {} in course {}",
                user_id, course_id
            ))),
        }
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn create(&self, course_id: i64, draft: GroupDraft) -> RepositoryResult<Group> {
        let mut tables = self.write()?;

        if !tables.courses.contains_key(&course_id) {
            return Err(RepositoryError::NotFound(format!("Course {}", course_id)));
        }

        let group = Group {
            id: Tables::next_id(&mut tables.last_ids.groups),
            tutor_id: draft.tutor_id,
            course_id,
            description: draft.description,
        };
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Group>> {
        Ok(self.read()?.groups.get(&id).cloned())
    }

    async fn find_by_course(&self, course_id: i64) -> RepositoryResult<Vec<Group>> {
        Ok(self
            .read()?
            .groups
            .values()
            .filter(|g| g.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn update(&self, group: &Group) -> RepositoryResult<()> {
        match self.write()?.groups.get_mut(&group.id) {
            Some(stored) => {
                *stored = group.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("Group {}", group.id))),
        }
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut tables = self.write()?;

        if tables.groups.remove(&id).is_none() {
            return Err(RepositoryError::NotFound(format!("Group {}", id)));
        }
        tables.group_members.retain(|(group_id, _)| *group_id != id);

        Ok(())
    }

    async fn find_for_member(&self, course_id: i64, user_id: i64) -> RepositoryResult<Option<Group>> {
        let tables = self.read()?;
        Ok(tables
            .group_members
            .iter()
            .filter(|(_, uid)| *uid == user_id)
            .filter_map(|(group_id, _)| tables.groups.get(group_id))
            .find(|g| g.course_id == course_id)
            .cloned())
    }

    async fn find_for_tutor(&self, course_id: i64, tutor_id: i64) -> RepositoryResult<Option<Group>> {
        Ok(self
            .read()?
            .groups
            .values()
            .find(|g| g.course_id == course_id && g.tutor_id == tutor_id)
            .cloned())
    }

    async fn assign_member(&self, group_id: i64, user_id: i64) -> RepositoryResult<()> {
        let mut tables = self.write()?;

        let course_id = tables
            .groups
            .get(&group_id)
            .map(|g| g.course_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Group {}", group_id)))?;

        let siblings: BTreeSet<i64> = tables
            .groups
            .values()
            .filter(|g| g.course_id == course_id)
            .map(|g| g.id)
            .collect();
        tables
            .group_members
            .retain(|(gid, uid)| !(*uid == user_id && siblings.contains(gid)));
        tables.group_members.insert((group_id, user_id));

        Ok(())
    }
}

#[async_trait]
impl MaterialRepository for InMemoryStore {
    async fn create(&self, course_id: i64, draft: MaterialDraft) -> RepositoryResult<Material> {
        let mut tables = self.write()?;

        if !tables.courses.contains_key(&course_id) {
            return Err(RepositoryError::NotFound(format!("Course {}", course_id)));
        }

        let material = Material {
            id: Tables::next_id(&mut tables.last_ids.materials),
            course_id,
            name: draft.name,
            filename: draft.filename,
            kind: draft.kind,
            publish_at: draft.publish_at,
            lecture_at: draft.lecture_at,
        };
        tables.materials.insert(material.id, material.clone());
        Ok(material)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Material>> {
        Ok(self.read()?.materials.get(&id).cloned())
    }

    async fn find_by_course(&self, course_id: i64) -> RepositoryResult<Vec<Material>> {
        let mut materials: Vec<Material> = self
            .read()?
            .materials
            .values()
            .filter(|m| m.course_id == course_id)
            .cloned()
            .collect();
        materials.sort_by_key(|m| (m.lecture_at, m.id));
        Ok(materials)
    }

    async fn update(&self, material: &Material) -> RepositoryResult<()> {
        match self.write()?.materials.get_mut(&material.id) {
            Some(stored) => {
                *stored = material.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("Material {}", material.id))),
        }
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        if self.write()?.materials.remove(&id).is_none() {
            return Err(RepositoryError::NotFound(format!("Material {}", id)));
        }
        Ok(())
    }
}
