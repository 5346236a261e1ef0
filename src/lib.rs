//! Back-office d'administration hospitalière : comptes (médecins et
//! réceptionnistes) et dossiers patients, derrière une authentification par
//! bearer token et un contrôle d'accès par rôle.

pub mod authorization;
pub mod backend;
pub mod config;
pub mod consts;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;
