use anyhow::Result;
use async_trait::async_trait;

use crate::api::ApiClient;
use crate::models::{
    Appointment, City, CityData, CreateAppointment, CreateDestination, CreateUser, Destination,
    UpdateAppointment, UpdateDestination, UpdateUser, User,
};

use super::{FailureText, Resource};

/// `/users`: travelers and tour guides share one collection.
#[derive(Clone)]
pub struct UsersApi(pub ApiClient);

#[derive(Clone)]
pub struct CitiesApi(pub ApiClient);

#[derive(Clone)]
pub struct DestinationsApi(pub ApiClient);

#[derive(Clone)]
pub struct AppointmentsApi(pub ApiClient);

#[async_trait]
impl Resource for UsersApi {
    type Item = User;
    type Create = CreateUser;
    type Update = UpdateUser;

    const SINGULAR: &'static str = "User";
    const PLURAL: &'static str = "users";
    const FAILURES: FailureText = FailureText {
        list: "Failed to fetch users data",
        fetch_one: "Failed to fetch user data",
        create: "Failed to fetch user data",
        update: "Failed to fetch user data",
        delete: "Failed to delete user data",
    };

    fn key(item: &User) -> i64 {
        item.id
    }

    async fn list(&self) -> Result<Vec<User>> {
        self.0.fetch_users().await
    }

    async fn get(&self, id: i64) -> Result<Option<User>> {
        self.0.fetch_user(id).await.map(Some)
    }

    async fn create(&self, data: &CreateUser) -> Result<User> {
        self.0.create_user(data).await
    }

    async fn update(&self, id: i64, data: &UpdateUser) -> Result<User> {
        self.0.update_user(id, data).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.0.delete_user(id).await
    }
}

#[async_trait]
impl Resource for CitiesApi {
    type Item = City;
    type Create = CityData;
    type Update = CityData;

    const SINGULAR: &'static str = "City";
    const PLURAL: &'static str = "cities";
    const FAILURES: FailureText = FailureText {
        list: "Failed to fetch cities data",
        fetch_one: "Failed to fetch city data",
        create: "Failed to create a new city",
        update: "Failed to update city data",
        delete: "Failed to delete city data",
    };

    fn key(item: &City) -> i64 {
        item.id
    }

    async fn list(&self) -> Result<Vec<City>> {
        self.0.fetch_cities().await
    }

    async fn get(&self, id: i64) -> Result<Option<City>> {
        self.0.fetch_city(id).await.map(Some)
    }

    async fn create(&self, data: &CityData) -> Result<City> {
        self.0.create_city(data).await
    }

    async fn update(&self, id: i64, data: &CityData) -> Result<City> {
        self.0.update_city(id, data).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.0.delete_city(id).await
    }
}

#[async_trait]
impl Resource for DestinationsApi {
    type Item = Destination;
    type Create = CreateDestination;
    type Update = UpdateDestination;

    const SINGULAR: &'static str = "Destination";
    const PLURAL: &'static str = "destinations";
    const FAILURES: FailureText = FailureText {
        list: "Failed to fetch destinations data",
        fetch_one: "Failed to fetch destination data",
        create: "Failed to create destination data",
        update: "Failed to update destination data",
        delete: "Failed to delete destination data",
    };

    fn key(item: &Destination) -> i64 {
        item.id
    }

    async fn list(&self) -> Result<Vec<Destination>> {
        self.0.fetch_destinations().await
    }

    async fn create(&self, data: &CreateDestination) -> Result<Destination> {
        self.0.create_destination(data).await
    }

    async fn update(&self, id: i64, data: &UpdateDestination) -> Result<Destination> {
        self.0.update_destination(id, data).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.0.delete_destination(id).await
    }
}

#[async_trait]
impl Resource for AppointmentsApi {
    type Item = Appointment;
    type Create = CreateAppointment;
    type Update = UpdateAppointment;

    const SINGULAR: &'static str = "Appointment";
    const PLURAL: &'static str = "appointments";
    const FAILURES: FailureText = FailureText {
        list: "Failed to fetch appointments data",
        fetch_one: "Failed to fetch appointment data",
        create: "Failed to create appointment",
        update: "Failed to update appointment",
        delete: "Failed to delete appointment",
    };

    fn key(item: &Appointment) -> i64 {
        item.id
    }

    async fn list(&self) -> Result<Vec<Appointment>> {
        self.0.fetch_appointments().await
    }

    async fn create(&self, data: &CreateAppointment) -> Result<Appointment> {
        self.0.create_appointment(data).await
    }

    async fn update(&self, id: i64, data: &UpdateAppointment) -> Result<Appointment> {
        self.0.update_appointment(id, data).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.0.delete_appointment(id).await
    }
}
